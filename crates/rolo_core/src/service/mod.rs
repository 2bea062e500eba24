//! Use-case services over the entity store.
//!
//! # Responsibility
//! - Provide the write entry points the UI calls: validate input, stamp
//!   IDs and timestamps, then write through the store.
//!
//! # Invariants
//! - Validation happens before any store write and is surfaced
//!   synchronously; a failed write leaves no partial state behind.
//! - Read paths reject records that no longer match the expected shape
//!   instead of masking them (tolerant decoding belongs to the
//!   observation/view paths only).

pub mod contact_service;
pub mod meeting_service;
pub mod task_service;

pub use contact_service::{ContactService, NewContact};
pub use meeting_service::{MeetingService, NewMeeting};
pub use task_service::{NewTask, TaskService};

use crate::model::{RecordId, ValidationError};
use crate::store::StoreError;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error surface of the service layer. Nothing here is fatal: every
/// failure is local to the triggering operation and prior state stays
/// intact.
#[derive(Debug)]
pub enum ServiceError {
    Validation(ValidationError),
    Store(StoreError),
    NotFound(RecordId),
    InvalidRecord {
        record_id: RecordId,
        source: serde_json::Error,
    },
    Encode(serde_json::Error),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::InvalidRecord { record_id, source } => {
                write!(f, "invalid persisted record `{record_id}`: {source}")
            }
            Self::Encode(err) => write!(f, "failed to encode record: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidRecord { source, .. } => Some(source),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

pub(crate) fn decode_strict<T: serde::de::DeserializeOwned>(
    records: Vec<(RecordId, Value)>,
) -> ServiceResult<Vec<T>> {
    records
        .into_iter()
        .map(|(record_id, doc)| {
            serde_json::from_value(doc)
                .map_err(|source| ServiceError::InvalidRecord { record_id, source })
        })
        .collect()
}

pub(crate) fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
