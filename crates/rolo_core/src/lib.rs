//! Core domain logic for Rolo, a personal CRM.
//! This crate is the single source of truth for business invariants:
//! contact/task/meeting records, the meeting archival lifecycle, and the
//! derived views the UI renders from.

pub mod clock;
pub mod db;
pub mod lifecycle;
pub mod link;
pub mod logging;
pub mod model;
pub mod service;
pub mod session;
pub mod store;
pub mod urgency;
pub mod views;

pub use clock::{Clock, FixedClock, SystemClock};
pub use lifecycle::{sweep_expired, MeetingState, SweepReport, GRACE_PERIOD_HOURS};
pub use link::{resolve_reference, ResolvedReference};
pub use logging::{default_log_level, init_logging};
pub use model::contact::{Contact, HistoryEntry};
pub use model::meeting::Meeting;
pub use model::task::Task;
pub use model::{RecordId, ValidationError};
pub use service::{
    ContactService, MeetingService, NewContact, NewMeeting, NewTask, ServiceError, ServiceResult,
    TaskService,
};
pub use session::{AuthProvider, SingleUserAuth, UserId};
pub use store::sqlite::SqliteEntityStore;
pub use store::{
    Collection, CollectionSnapshot, EntityStore, StoreError, StoreResult, Subscription, WriteBatch,
};
pub use urgency::{classify, UrgencyTier};
pub use views::LiveViews;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
