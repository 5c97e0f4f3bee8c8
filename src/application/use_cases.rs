//! One type per application action. Each forwards to a single repository
//! method and returns its result untouched, giving every action its own
//! substitution point.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::domain::{Task, TaskDraft, TaskId};
use crate::ports::{RepositoryResult, TaskRepository};

#[derive(Clone)]
pub struct GetAllTasks {
    repository: Arc<dyn TaskRepository>,
}

impl GetAllTasks {
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) -> RepositoryResult<Vec<Task>> {
        self.repository.get_all_tasks().await
    }
}

#[derive(Clone)]
pub struct CreateTask {
    repository: Arc<dyn TaskRepository>,
}

impl CreateTask {
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, draft: &TaskDraft) -> RepositoryResult<Task> {
        self.repository.create_task(draft).await
    }
}

#[derive(Clone)]
pub struct UpdateTask {
    repository: Arc<dyn TaskRepository>,
}

impl UpdateTask {
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, id: TaskId, draft: &TaskDraft) -> RepositoryResult<Task> {
        self.repository.update_task(id, draft).await
    }
}

#[derive(Clone)]
pub struct DeleteTask {
    repository: Arc<dyn TaskRepository>,
}

impl DeleteTask {
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, id: TaskId) -> RepositoryResult<()> {
        self.repository.delete_task(id).await
    }
}

#[derive(Clone)]
pub struct DeleteAllTasks {
    repository: Arc<dyn TaskRepository>,
}

impl DeleteAllTasks {
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) -> RepositoryResult<()> {
        self.repository.delete_all_tasks().await
    }
}

#[derive(Clone)]
pub struct SearchTasksByTitle {
    repository: Arc<dyn TaskRepository>,
}

impl SearchTasksByTitle {
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, title: &str) -> RepositoryResult<Vec<Task>> {
        self.repository.search_tasks_by_title(title).await
    }
}

#[derive(Clone)]
pub struct SearchTasksByDueDate {
    repository: Arc<dyn TaskRepository>,
}

impl SearchTasksByDueDate {
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, due_date: NaiveDate) -> RepositoryResult<Vec<Task>> {
        self.repository.search_tasks_by_due_date(due_date).await
    }
}

/// All task actions, wired to one repository.
#[derive(Clone)]
pub struct TaskUseCases {
    pub get_all: GetAllTasks,
    pub create: CreateTask,
    pub update: UpdateTask,
    pub delete: DeleteTask,
    pub delete_all: DeleteAllTasks,
    pub search_by_title: SearchTasksByTitle,
    pub search_by_due_date: SearchTasksByDueDate,
}

impl TaskUseCases {
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self {
            get_all: GetAllTasks::new(repository.clone()),
            create: CreateTask::new(repository.clone()),
            update: UpdateTask::new(repository.clone()),
            delete: DeleteTask::new(repository.clone()),
            delete_all: DeleteAllTasks::new(repository.clone()),
            search_by_title: SearchTasksByTitle::new(repository.clone()),
            search_by_due_date: SearchTasksByDueDate::new(repository),
        }
    }
}
