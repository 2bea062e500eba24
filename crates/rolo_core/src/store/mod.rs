//! Entity store contract: observable per-user record collections.
//!
//! # Responsibility
//! - Define the storage interface the rest of the core writes through.
//! - Define subscription and batching primitives independent of any
//!   specific backend.
//!
//! # Invariants
//! - A subscription handler fires once immediately with the current
//!   snapshot (possibly empty) and again after every committed mutation of
//!   its user/collection.
//! - Handlers are never invoked re-entrantly: a mutation performed inside
//!   a handler queues its notifications until the running handler returns.
//! - `unsubscribe` is idempotent and no handler fires after it returns.
//! - A batch applies atomically; partial application is never observable.

use crate::db::DbError;
use crate::model::RecordId;
use crate::session::UserId;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod sqlite;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-layer error. Write failures leave prior state intact; callers
/// may retry, the store never retries on its own.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// A persisted document is not valid JSON. The store only writes valid
    /// JSON, so this indicates out-of-band corruption.
    Corrupt {
        record_id: RecordId,
        source: serde_json::Error,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Corrupt { record_id, source } => {
                write!(f, "corrupt document for record `{record_id}`: {source}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Corrupt { source, .. } => Some(source),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Top-level record collections under a user partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Contacts,
    Tasks,
    Meetings,
}

impl Collection {
    /// Path segment in `users/{user}/{collection}/{record}` addressing.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contacts => "contacts",
            Self::Tasks => "tasks",
            Self::Meetings => "meetings",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One mutation inside a [`WriteBatch`].
#[derive(Debug, Clone)]
pub enum WriteOp {
    Put {
        collection: Collection,
        id: RecordId,
        doc: Value,
    },
    Delete {
        collection: Collection,
        id: RecordId,
    },
}

/// An ordered group of mutations applied as one atomic unit.
///
/// The archival transition depends on this: the history write and the
/// meeting removal must both land or neither.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, collection: Collection, id: impl Into<RecordId>, doc: Value) {
        self.ops.push(WriteOp::Put {
            collection,
            id: id.into(),
            doc,
        });
    }

    pub fn delete(&mut self, collection: Collection, id: impl Into<RecordId>) {
        self.ops.push(WriteOp::Delete {
            collection,
            id: id.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }
}

/// Snapshot of one user/collection delivered to subscription handlers.
///
/// `records` preserves insertion order; an empty collection delivers an
/// empty snapshot, which is distinct from "not yet loaded" only at the UI
/// layer, never inside the core.
#[derive(Debug, Clone)]
pub struct CollectionSnapshot {
    pub user: UserId,
    pub collection: Collection,
    pub records: Vec<(RecordId, Value)>,
}

/// Subscription callback. Invoked on one logical thread, in the order the
/// store commits writes, never concurrently with itself.
pub type ChangeHandler = Box<dyn FnMut(&CollectionSnapshot)>;

/// Cancellation handle returned by [`EntityStore::subscribe`].
///
/// Dropping the handle unsubscribes. Explicit [`unsubscribe`] is
/// idempotent and guarantees no further handler invocation after it
/// returns.
///
/// [`unsubscribe`]: Subscription::unsubscribe
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Decodes a snapshot into typed records, skipping documents that do not
/// match the expected shape. The store is schemaless, so observation paths
/// tolerate junk; strict write paths reject it instead.
pub fn decode_snapshot<T: serde::de::DeserializeOwned>(records: &[(RecordId, Value)]) -> Vec<T> {
    let mut decoded = Vec::with_capacity(records.len());
    for (record_id, doc) in records {
        match serde_json::from_value(doc.clone()) {
            Ok(record) => decoded.push(record),
            Err(err) => log::warn!(
                "event=record_decode module=store status=skipped record_id={record_id} error={err}"
            ),
        }
    }
    decoded
}

/// Observable per-user record storage.
///
/// Writes are fire-and-forget from the caller's perspective but surface
/// failure through [`StoreResult`]; callers must not assume a write took
/// effect until the corresponding subscription notification reflects it.
pub trait EntityStore {
    /// Current snapshot of one collection, in insertion order.
    fn get(&self, user: &UserId, collection: Collection) -> StoreResult<Vec<(RecordId, Value)>>;

    /// Upserts one record. Last write wins at whole-record granularity.
    fn put(
        &self,
        user: &UserId,
        collection: Collection,
        id: &RecordId,
        doc: Value,
    ) -> StoreResult<()>;

    /// Removes one record. Removing an absent record is a no-op.
    fn delete(&self, user: &UserId, collection: Collection, id: &RecordId) -> StoreResult<()>;

    /// Applies a batch atomically, then notifies each touched collection.
    fn apply(&self, user: &UserId, batch: WriteBatch) -> StoreResult<()>;

    /// Registers a change handler for one user/collection.
    fn subscribe(
        &self,
        user: &UserId,
        collection: Collection,
        handler: ChangeHandler,
    ) -> Subscription;
}
