use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{DomainError, DomainResult};

/// Wire and display format for calendar dates (ISO-8601 `yyyy-MM-dd`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TaskId {
    fn from(id: i64) -> Self {
        TaskId(id)
    }
}

impl FromStr for TaskId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(TaskId)
            .map_err(|_| DomainError::InvalidId(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Assigned by the server; `None` until the task has been created remotely.
    pub id: Option<TaskId>,
    pub title: String,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub completed: bool,
}

impl Task {
    /// A task is overdue when it is still open and its due date has passed.
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date < today
    }

    pub fn status_display(&self) -> &'static str {
        if self.completed {
            "Complete"
        } else {
            "Open"
        }
    }

    /// Format due date relative to `today` for display
    pub fn due_date_display(&self, today: NaiveDate) -> String {
        match (self.due_date - today).num_days() {
            0 => "Today".to_string(),
            1 => "Tomorrow".to_string(),
            -1 => "Yesterday".to_string(),
            d if d < 0 => format!("{} days ago", -d),
            d if d <= 7 => format!("In {d} days"),
            _ => format_date(self.due_date),
        }
    }
}

/// Sort ascending by due date; ties keep their server order.
pub fn sort_by_due_date(tasks: &mut [Task]) {
    tasks.sort_by_key(|task| task.due_date);
}

/// The fields a client submits when creating or updating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub due_date: NaiveDate,
}

impl TaskDraft {
    /// Blank descriptions are sent as absent rather than as empty strings.
    pub fn new(title: impl Into<String>, description: Option<String>, due_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: description.filter(|d| !d.is_empty()),
            due_date,
        }
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| DomainError::InvalidDate(value.to_string()))
}
