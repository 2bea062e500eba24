//! Domain records persisted by the entity store.
//!
//! # Responsibility
//! - Define the canonical contact/task/meeting record shapes.
//! - Provide field validation shared by all write paths.
//!
//! # Invariants
//! - Record IDs are epoch-millisecond timestamps rendered as strings and
//!   are only unique when no two records are created in the same
//!   user/collection within the same millisecond. Accepted limitation for
//!   the single-user, single-process workload this crate targets.
//! - Serialized field names are camelCase to match the at-rest schema.

pub mod contact;
pub mod meeting;
pub mod task;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for a persisted record. Opaque to callers.
pub type RecordId = String;

/// Builds a record ID from an epoch-millisecond timestamp.
pub fn record_id_from_millis(epoch_millis: i64) -> RecordId {
    epoch_millis.to_string()
}

/// Field-level validation failure, surfaced before any store write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is empty after trimming.
    MissingField(&'static str),
    /// A contact's `referred_by` points at the contact itself.
    SelfReferral(RecordId),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "required field `{field}` is empty"),
            Self::SelfReferral(id) => {
                write!(f, "contact `{id}` cannot be referred by itself")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}
