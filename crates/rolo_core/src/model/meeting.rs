//! Meeting record.
//!
//! # Invariants
//! - `archived = true` is a transient marker set immediately before the
//!   record leaves the active collection; it is never an observable
//!   persisted state. "Archived" and "deleted from the active set" are one
//!   transition, not two.
//! - `date`/`time` are stored as entered. The store is schemaless, so
//!   unparseable values can exist; they are tolerated, never a panic.

use crate::model::{require, RecordId, ValidationError};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A scheduled meeting in the active working set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: RecordId,
    pub topic: String,
    /// Calendar date as entered, `YYYY-MM-DD`.
    pub date: String,
    /// Wall-clock time as entered, `HH:MM`.
    pub time: String,
    /// Weak reference to a contact; dangling IDs are tolerated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<RecordId>,
    #[serde(default)]
    pub notes: String,
    pub created_at: i64,
    #[serde(default)]
    pub archived: bool,
}

impl Meeting {
    /// Checks write-time invariants: topic and date are required.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("topic", &self.topic)?;
        require("date", &self.date)
    }

    /// The wall-clock instant this meeting starts.
    ///
    /// Returns `None` when `date`/`time` do not parse; such a meeting never
    /// expires and classifies as a normal, far-off meeting.
    pub fn instant(&self) -> Option<NaiveDateTime> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()?;
        let raw_time = self.time.trim();
        let time = NaiveTime::parse_from_str(raw_time, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw_time, "%H:%M:%S"))
            .ok()?;
        Some(date.and_time(time))
    }
}

#[cfg(test)]
mod tests {
    use super::Meeting;
    use crate::model::ValidationError;
    use chrono::NaiveDateTime;

    fn sample() -> Meeting {
        Meeting {
            id: "1700000000002".to_string(),
            topic: "Coffee catch-up".to_string(),
            date: "2024-01-01".to_string(),
            time: "10:00".to_string(),
            contact_id: None,
            notes: String::new(),
            created_at: 1_700_000_000_002,
            archived: false,
        }
    }

    #[test]
    fn validate_requires_topic_and_date() {
        let mut meeting = sample();
        meeting.topic = String::new();
        assert_eq!(
            meeting.validate().expect_err("blank topic rejected"),
            ValidationError::MissingField("topic")
        );

        let mut meeting = sample();
        meeting.date = "  ".to_string();
        assert_eq!(
            meeting.validate().expect_err("blank date rejected"),
            ValidationError::MissingField("date")
        );
    }

    #[test]
    fn instant_combines_date_and_time() {
        let expected =
            NaiveDateTime::parse_from_str("2024-01-01 10:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(sample().instant(), Some(expected));
    }

    #[test]
    fn instant_tolerates_junk() {
        let mut meeting = sample();
        meeting.time = "noonish".to_string();
        assert_eq!(meeting.instant(), None);
        meeting.time = "10:00".to_string();
        meeting.date = "01/01/2024".to_string();
        assert_eq!(meeting.instant(), None);
    }
}
