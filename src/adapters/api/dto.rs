use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{format_date, parse_date, Task, TaskDraft, TaskId};
use crate::ports::{RepositoryError, RepositoryResult};

/// Response body as sent by the task service. Some deployments wrap the
/// payload in `{ success, message, data }`, others return it bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ApiPayload<T> {
    Envelope {
        success: bool,
        #[serde(default)]
        message: Option<String>,
        data: Option<T>,
    },
    Bare(T),
}

impl<T> ApiPayload<T> {
    /// Unwrap the payload; an envelope reporting `success: false` is a failure.
    pub fn into_data(self) -> RepositoryResult<Option<T>> {
        match self {
            ApiPayload::Envelope {
                success: false,
                message,
                ..
            } => Err(RepositoryError::Failure(
                message.unwrap_or_else(|| "Request failed".to_string()),
            )),
            ApiPayload::Envelope { data, .. } => Ok(data),
            ApiPayload::Bare(data) => Ok(Some(data)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDto {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "dueDate", alias = "due_date")]
    pub due_date: String, // YYYY-MM-DD format
    #[serde(default)]
    pub completed: bool,
}

// Request DTOs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRequestDto {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "dueDate")]
    pub due_date: String, // YYYY-MM-DD format
}

impl TaskRequestDto {
    pub fn from_domain(title: &str, description: Option<&str>, due_date: NaiveDate) -> Self {
        Self {
            title: title.to_string(),
            description: description.map(str::to_string),
            due_date: format_date(due_date),
        }
    }
}

// Conversion implementations
impl From<&TaskDraft> for TaskRequestDto {
    fn from(draft: &TaskDraft) -> Self {
        Self::from_domain(&draft.title, draft.description.as_deref(), draft.due_date)
    }
}

impl TryFrom<TaskDto> for Task {
    type Error = RepositoryError;

    fn try_from(dto: TaskDto) -> Result<Self, Self::Error> {
        let due_date = parse_date(&dto.due_date)
            .map_err(|e| RepositoryError::Response(format!("Failed to parse task: {e}")))?;

        Ok(Self {
            id: dto.id.map(TaskId),
            title: dto.title,
            description: dto.description,
            due_date,
            completed: dto.completed,
        })
    }
}

pub fn into_tasks(dtos: Vec<TaskDto>) -> RepositoryResult<Vec<Task>> {
    dtos.into_iter().map(Task::try_from).collect()
}
