//! Task record.
//!
//! # Invariants
//! - `completed = true` is a transient display state only: the core
//!   operation for completing a task is immediate deletion. There is no
//!   "done but kept" state; any fade-out delay belongs to the UI layer.

use crate::model::{require, RecordId, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A to-do item, optionally due on a date and linked to a contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: RecordId,
    pub title: String,
    /// Calendar date as entered (`YYYY-MM-DD`), empty/absent when undated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Weak reference to a contact; dangling IDs are tolerated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<RecordId>,
    pub completed: bool,
    pub created_at: i64,
}

impl Task {
    /// Checks write-time invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title)
    }

    /// Due date parsed for sorting. Unparseable values sort as undated.
    pub fn parsed_due_date(&self) -> Option<NaiveDate> {
        let raw = self.due_date.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }
}
