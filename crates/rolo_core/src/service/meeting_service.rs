//! Meeting use-case service.
//!
//! # Invariants
//! - A meeting is created Scheduled; expiry and archival are handled by
//!   the lifecycle sweep on observation, never by these entry points.
//! - `save_notes` writes the whole record (field-group granularity of one
//!   put); concurrent editors resolve last-write-wins.

use crate::clock::Clock;
use crate::model::meeting::Meeting;
use crate::model::{record_id_from_millis, RecordId};
use crate::service::{decode_strict, normalize_optional, ServiceError, ServiceResult};
use crate::session::UserId;
use crate::store::{Collection, EntityStore};
use log::info;

/// Default start time when the add form leaves the time empty.
const DEFAULT_TIME: &str = "12:00";

/// Request model for scheduling a meeting.
#[derive(Debug, Clone, Default)]
pub struct NewMeeting {
    pub topic: String,
    /// `YYYY-MM-DD`, required.
    pub date: String,
    /// `HH:MM`; empty defaults to midday.
    pub time: String,
    /// Optional weak reference to a contact.
    pub contact_id: Option<RecordId>,
}

/// Entry points for the active meetings collection.
pub struct MeetingService<'a, S: EntityStore + ?Sized> {
    store: &'a S,
    clock: &'a dyn Clock,
    user: UserId,
}

impl<'a, S: EntityStore + ?Sized> MeetingService<'a, S> {
    pub fn new(store: &'a S, clock: &'a dyn Clock, user: UserId) -> Self {
        Self { store, clock, user }
    }

    pub fn add(&self, request: NewMeeting) -> ServiceResult<Meeting> {
        let now_millis = self.clock.epoch_millis();
        let time = request.time.trim();
        let meeting = Meeting {
            id: record_id_from_millis(now_millis),
            topic: request.topic.trim().to_string(),
            date: request.date.trim().to_string(),
            time: if time.is_empty() {
                DEFAULT_TIME.to_string()
            } else {
                time.to_string()
            },
            contact_id: normalize_optional(request.contact_id),
            notes: String::new(),
            created_at: now_millis,
            archived: false,
        };
        meeting.validate()?;

        let doc = serde_json::to_value(&meeting).map_err(ServiceError::Encode)?;
        self.store
            .put(&self.user, Collection::Meetings, &meeting.id, doc)?;
        info!(
            "event=meeting_added module=service status=ok meeting_id={}",
            meeting.id
        );
        Ok(meeting)
    }

    /// Updates the notes of an active meeting. The notes travel into the
    /// contact's history when the meeting is archived.
    pub fn save_notes(&self, id: &RecordId, notes: impl Into<String>) -> ServiceResult<Meeting> {
        let meetings: Vec<Meeting> =
            decode_strict(self.store.get(&self.user, Collection::Meetings)?)?;
        let mut meeting = meetings
            .into_iter()
            .find(|meeting| meeting.id == *id)
            .ok_or_else(|| ServiceError::NotFound(id.clone()))?;

        meeting.notes = notes.into();
        let doc = serde_json::to_value(&meeting).map_err(ServiceError::Encode)?;
        self.store
            .put(&self.user, Collection::Meetings, &meeting.id, doc)?;
        Ok(meeting)
    }

    /// Removes a meeting without archiving it; nothing is written to any
    /// contact's history.
    pub fn delete(&self, id: &RecordId) -> ServiceResult<()> {
        self.store.delete(&self.user, Collection::Meetings, id)?;
        info!("event=meeting_deleted module=service status=ok meeting_id={id}");
        Ok(())
    }

    /// All active meetings in insertion order, strictly decoded.
    pub fn list(&self) -> ServiceResult<Vec<Meeting>> {
        decode_strict(self.store.get(&self.user, Collection::Meetings)?)
    }
}
