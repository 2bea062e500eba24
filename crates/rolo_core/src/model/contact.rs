//! Contact record and its nested meeting history.
//!
//! # Responsibility
//! - Define the contact shape, including the per-contact archive of past
//!   meetings.
//! - Validate contact writes.
//!
//! # Invariants
//! - `referred_by` holds either another contact's ID or free text (for
//!   example "LinkedIn"); it must never equal the contact's own ID.
//!   Longer referral cycles are not prevented.
//! - History entries are immutable once written and keyed by their
//!   archival timestamp.

use crate::model::{require, RecordId, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One archived meeting, nested under the contact it was held with.
///
/// Copied verbatim from the source meeting at archival time; display
/// ordering is `archived_at` descending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub topic: String,
    /// Calendar date as entered, `YYYY-MM-DD`.
    pub date: String,
    /// Wall-clock time as entered, `HH:MM`.
    pub time: String,
    pub notes: String,
    /// Epoch milliseconds of the archival observation.
    pub archived_at: i64,
}

/// A person in the user's network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: RecordId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Weak reference: a contact ID when the referrer is also tracked,
    /// otherwise free text. Dangling IDs degrade to display fallbacks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referred_by: Option<String>,
    /// Archived meetings held with this contact, keyed by history entry ID.
    #[serde(default)]
    pub meeting_history: BTreeMap<RecordId, HistoryEntry>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Contact {
    /// Checks write-time invariants.
    ///
    /// # Errors
    /// - [`ValidationError::MissingField`] when first or last name is blank.
    /// - [`ValidationError::SelfReferral`] when `referred_by` equals `id`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("first_name", &self.first_name)?;
        require("last_name", &self.last_name)?;
        if self.referred_by.as_deref() == Some(self.id.as_str()) {
            return Err(ValidationError::SelfReferral(self.id.clone()));
        }
        Ok(())
    }

    /// "First Last" as rendered on meeting cards.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Abbreviated "First L." form as rendered on task cards.
    pub fn short_name(&self) -> String {
        match self.last_name.chars().next() {
            Some(initial) => format!("{} {initial}.", self.first_name),
            None => self.first_name.clone(),
        }
    }

    /// History entries ordered newest-first for display.
    pub fn history_newest_first(&self) -> Vec<(&RecordId, &HistoryEntry)> {
        let mut entries: Vec<_> = self.meeting_history.iter().collect();
        entries.sort_by(|a, b| b.1.archived_at.cmp(&a.1.archived_at));
        entries
    }
}
