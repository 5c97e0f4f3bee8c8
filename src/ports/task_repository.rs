use async_trait::async_trait;
use chrono::NaiveDate;

use super::RepositoryResult;
use crate::domain::{Task, TaskDraft, TaskId};

/// Remote task storage. Each method performs exactly one call and never
/// retries; retry policy belongs to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn get_all_tasks(&self) -> RepositoryResult<Vec<Task>>;
    async fn create_task(&self, draft: &TaskDraft) -> RepositoryResult<Task>;
    async fn update_task(&self, id: TaskId, draft: &TaskDraft) -> RepositoryResult<Task>;
    async fn delete_task(&self, id: TaskId) -> RepositoryResult<()>;
    async fn delete_all_tasks(&self) -> RepositoryResult<()>;
    async fn search_tasks_by_title(&self, title: &str) -> RepositoryResult<Vec<Task>>;
    async fn search_tasks_by_due_date(&self, due_date: NaiveDate) -> RepositoryResult<Vec<Task>>;
}
