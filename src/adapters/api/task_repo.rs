use async_trait::async_trait;
use chrono::NaiveDate;

use super::{into_tasks, TaskApiClient, TaskDto, TaskRequestDto};
use crate::{
    domain::{format_date, Task, TaskDraft, TaskId},
    ports::{ApiRoutes, RepositoryError, RepositoryResult, TaskRepository},
};

#[derive(Clone)]
pub struct RestTaskRepository {
    client: TaskApiClient,
    routes: ApiRoutes,
}

impl RestTaskRepository {
    pub fn new(client: TaskApiClient, routes: ApiRoutes) -> Self {
        Self { client, routes }
    }

    fn task_path(&self, id: TaskId) -> String {
        format!("{}/{}", self.routes.tasks_path.trim_end_matches('/'), id)
    }

    fn build_query_string(&self, params: &[(&str, String)]) -> String {
        if params.is_empty() {
            return String::new();
        }

        format!(
            "?{}",
            params
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&")
        )
    }

    async fn get_task_list(&self, path: &str) -> RepositoryResult<Vec<Task>> {
        let dtos: Option<Vec<TaskDto>> = self.client.get(path).await?;
        into_tasks(dtos.unwrap_or_default())
    }
}

#[async_trait]
impl TaskRepository for RestTaskRepository {
    async fn get_all_tasks(&self) -> RepositoryResult<Vec<Task>> {
        tracing::debug!("Fetching all tasks");
        self.get_task_list(&self.routes.tasks_path).await
    }

    async fn create_task(&self, draft: &TaskDraft) -> RepositoryResult<Task> {
        let request = TaskRequestDto::from(draft);
        tracing::debug!(title = %request.title, due = %request.due_date, "Creating task");

        let dto: Option<TaskDto> = self.client.post(&self.routes.tasks_path, &request).await?;
        dto.ok_or_else(|| {
            RepositoryError::Response("Task creation failed: No data returned".to_string())
        })?
        .try_into()
    }

    async fn update_task(&self, id: TaskId, draft: &TaskDraft) -> RepositoryResult<Task> {
        let request = TaskRequestDto::from(draft);
        tracing::debug!(%id, "Updating task");

        let dto: Option<TaskDto> = self.client.put(&self.task_path(id), &request).await?;
        dto.ok_or_else(|| {
            RepositoryError::Response("Task update failed: No data returned".to_string())
        })?
        .try_into()
    }

    async fn delete_task(&self, id: TaskId) -> RepositoryResult<()> {
        tracing::debug!(%id, "Deleting task");
        self.client.delete(&self.task_path(id)).await
    }

    async fn delete_all_tasks(&self) -> RepositoryResult<()> {
        tracing::debug!("Deleting all tasks");
        self.client.delete(&self.routes.tasks_path).await
    }

    async fn search_tasks_by_title(&self, title: &str) -> RepositoryResult<Vec<Task>> {
        let query = self.build_query_string(&[("title", title.to_string())]);
        let path = format!("{}{query}", self.routes.search_path);
        self.get_task_list(&path).await
    }

    async fn search_tasks_by_due_date(&self, due_date: NaiveDate) -> RepositoryResult<Vec<Task>> {
        let query =
            self.build_query_string(&[(self.routes.due_date_param.as_str(), format_date(due_date))]);
        let path = format!("{}{query}", self.routes.search_path);
        self.get_task_list(&path).await
    }
}
