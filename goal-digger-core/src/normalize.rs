//! Form-to-record field mapping.
//!
//! Raw form values arrive as strings. Every mutating task and list operation
//! passes them through here before anything reaches the remote store, so blank
//! optionals become `None` and never an empty string.

use crate::errors::{SyncError, SyncResult};
use crate::models::{Task, TaskDetails};
use chrono::NaiveDate;
use uuid::Uuid;

/// Selector value meaning "no list selected".
pub const NO_LIST_SELECTED: &str = "none";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw task form fields, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub list_id: String,
}

impl TaskForm {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = due_date.into();
        self
    }

    pub fn with_list(mut self, list_id: impl Into<String>) -> Self {
        self.list_id = list_id.into();
        self
    }

    pub fn normalize(&self) -> SyncResult<TaskDetails> {
        let title = required(&self.title, "Task title is required")?;

        let due_date = match present(&self.due_date) {
            Some(raw) => Some(
                NaiveDate::parse_from_str(raw, DATE_FORMAT)
                    .map_err(|_| SyncError::validation(format!("Invalid due date: {}", raw)))?,
            ),
            None => None,
        };

        let list_id = match present(&self.list_id) {
            Some(raw) if raw == NO_LIST_SELECTED => None,
            Some(raw) => Some(
                Uuid::parse_str(raw)
                    .map_err(|_| SyncError::validation(format!("Invalid list: {}", raw)))?,
            ),
            None => None,
        };

        Ok(TaskDetails {
            title,
            description: self.description.clone(),
            list_id,
            due_date,
        })
    }
}

impl From<&Task> for TaskForm {
    fn from(task: &Task) -> Self {
        TaskForm {
            title: task.title.clone(),
            description: task.description_or_default().to_string(),
            due_date: task
                .due_date
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            list_id: task.list_id.map(|id| id.to_string()).unwrap_or_default(),
        }
    }
}

/// Trimmed list title, rejecting blanks.
pub fn list_title(raw: &str) -> SyncResult<String> {
    required(raw, "List title is required")
}

/// `None` for blank input, otherwise the trimmed value.
pub fn present(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn required(raw: &str, message: &str) -> SyncResult<String> {
    present(raw)
        .map(str::to_string)
        .ok_or_else(|| SyncError::validation(message))
}
