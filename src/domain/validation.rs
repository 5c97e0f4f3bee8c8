//! Field rules for the add/edit task form.
//!
//! Every validator is a pure function of its input (and `today` for the due
//! date), so each field's error can be checked on its own. `TaskForm` keeps the
//! raw text of each field next to its current error and recomputes overall
//! validity after every single-field edit.

use chrono::NaiveDate;
use serde::Serialize;

use super::task::parse_date;

pub const MAX_TITLE_CHARS: usize = 50;
pub const MAX_DESCRIPTION_CHARS: usize = 200;

pub const TITLE_REQUIRED: &str = "Title is required";
pub const TITLE_TOO_LONG: &str = "Title must be 50 characters or less";
pub const DESCRIPTION_TOO_LONG: &str = "Description must be 200 characters or less";
pub const DUE_DATE_REQUIRED: &str = "Due date is required";
pub const DUE_DATE_INVALID: &str = "Invalid date format. Use yyyy-MM-dd";
pub const DUE_DATE_IN_PAST: &str = "Due date must be today or later";

pub fn validate_title(title: &str) -> Option<&'static str> {
    if title.is_empty() {
        Some(TITLE_REQUIRED)
    } else if title.chars().count() > MAX_TITLE_CHARS {
        Some(TITLE_TOO_LONG)
    } else {
        None
    }
}

pub fn validate_description(description: &str) -> Option<&'static str> {
    (description.chars().count() > MAX_DESCRIPTION_CHARS).then_some(DESCRIPTION_TOO_LONG)
}

pub fn validate_due_date(due_date: &str, today: NaiveDate) -> Option<&'static str> {
    if due_date.is_empty() {
        return Some(DUE_DATE_REQUIRED);
    }
    match parse_date(due_date) {
        Err(_) => Some(DUE_DATE_INVALID),
        Ok(date) if date < today => Some(DUE_DATE_IN_PAST),
        Ok(_) => None,
    }
}

/// Snapshot of the editable form. Each `with_*` call replaces one field,
/// re-runs that field's validator and returns a new snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub title_error: Option<String>,
    pub description_error: Option<String>,
    pub due_date_error: Option<String>,
    pub is_form_valid: bool,
}

impl TaskForm {
    /// Prefill from existing values without flagging untouched fields.
    pub fn prefilled(title: &str, description: &str, due_date: &str, today: NaiveDate) -> Self {
        let mut form = Self {
            title: title.to_string(),
            description: description.to_string(),
            due_date: due_date.to_string(),
            ..Default::default()
        };
        form.is_form_valid = form.compute_validity(today);
        form
    }

    pub fn with_title(&self, title: &str, today: NaiveDate) -> Self {
        let mut next = Self {
            title: title.to_string(),
            title_error: validate_title(title).map(str::to_string),
            ..self.clone()
        };
        next.is_form_valid = next.compute_validity(today);
        next
    }

    pub fn with_description(&self, description: &str, today: NaiveDate) -> Self {
        let mut next = Self {
            description: description.to_string(),
            description_error: validate_description(description).map(str::to_string),
            ..self.clone()
        };
        next.is_form_valid = next.compute_validity(today);
        next
    }

    pub fn with_due_date(&self, due_date: &str, today: NaiveDate) -> Self {
        let mut next = Self {
            due_date: due_date.to_string(),
            due_date_error: validate_due_date(due_date, today).map(str::to_string),
            ..self.clone()
        };
        next.is_form_valid = next.compute_validity(today);
        next
    }

    /// Every field entered at once, each one validated.
    pub fn validated(title: &str, description: &str, due_date: &str, today: NaiveDate) -> Self {
        Self::default()
            .with_title(title, today)
            .with_description(description, today)
            .with_due_date(due_date, today)
    }

    pub fn errors(&self) -> Vec<&str> {
        [&self.title_error, &self.description_error, &self.due_date_error]
            .into_iter()
            .filter_map(|e| e.as_deref())
            .collect()
    }

    fn compute_validity(&self, today: NaiveDate) -> bool {
        let no_errors = self.title_error.is_none()
            && self.description_error.is_none()
            && self.due_date_error.is_none();

        no_errors
            && validate_title(&self.title).is_none()
            && validate_description(&self.description).is_none()
            && validate_due_date(&self.due_date, today).is_none()
    }
}
