//! Meeting lifecycle: Scheduled -> Expired -> Archived.
//!
//! # Responsibility
//! - Decide, purely, whether a meeting has passed its archival grace
//!   period.
//! - Migrate expired meetings into their contact's history and out of the
//!   active collection, atomically.
//!
//! # Invariants
//! - Detection is lazy: expiry is evaluated when the active collection is
//!   observed. A meeting nobody observes stays Scheduled; accepted
//!   tradeoff, there is no background timer.
//! - Archival is one atomic batch: the history write and the meeting
//!   removal both land or neither does. On failure the meeting stays in
//!   the active set and is retried on the next observation.
//! - Idempotence is structural: an archived meeting is absent from the
//!   active collection, so it can never be re-evaluated.
//! - A meeting whose contact reference does not resolve is removed without
//!   writing history anywhere; its notes are dropped. Intentional scope
//!   decision inherited from the product, not an oversight (see
//!   DESIGN.md).

use crate::model::contact::{Contact, HistoryEntry};
use crate::model::meeting::Meeting;
use crate::model::{record_id_from_millis, RecordId};
use crate::session::UserId;
use crate::store::{decode_snapshot, Collection, EntityStore, StoreResult, WriteBatch};
use chrono::{Duration, NaiveDateTime};
use log::{error, info};
use std::collections::BTreeMap;

/// Grace period after a meeting's start before it is considered expired.
pub const GRACE_PERIOD_HOURS: i64 = 2;

/// Lifecycle state of a meeting.
///
/// `Archived` is terminal and observed only transiently: archival removes
/// the record from the active collection in the same transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingState {
    Scheduled,
    Expired,
    Archived,
}

/// Pure transition check for a meeting still in the active collection.
///
/// `instant = None` (unparseable date/time) never expires.
pub fn evaluate(instant: Option<NaiveDateTime>, now: NaiveDateTime) -> MeetingState {
    match instant {
        Some(at) if now >= at + Duration::hours(GRACE_PERIOD_HOURS) => MeetingState::Expired,
        _ => MeetingState::Scheduled,
    }
}

/// Outcome of one archival sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepReport {
    /// Meetings moved out of the active collection.
    pub archived: usize,
    /// Meetings whose archival batch failed; they stay active and are
    /// retried on the next observation.
    pub failed: usize,
}

/// Archives every expired meeting in the user's active collection.
///
/// `now` is the observation instant; `now_millis` stamps `archived_at` and
/// the history entry IDs. Per-meeting batch failures are logged and
/// counted, not propagated, so one bad record cannot wedge the sweep.
///
/// # Errors
/// Only the initial collection reads can fail here.
pub fn sweep_expired<S: EntityStore + ?Sized>(
    store: &S,
    user: &UserId,
    now: NaiveDateTime,
    now_millis: i64,
) -> StoreResult<SweepReport> {
    let meetings: Vec<Meeting> = decode_snapshot(&store.get(user, Collection::Meetings)?);
    let expired: Vec<Meeting> = meetings
        .into_iter()
        .filter(|meeting| evaluate(meeting.instant(), now) == MeetingState::Expired)
        .collect();
    if expired.is_empty() {
        return Ok(SweepReport::default());
    }

    // Local working set so two meetings archiving onto the same contact in
    // one sweep both land in its history.
    let contacts: Vec<Contact> = decode_snapshot(&store.get(user, Collection::Contacts)?);
    let mut contacts: BTreeMap<RecordId, Contact> = contacts
        .into_iter()
        .map(|contact| (contact.id.clone(), contact))
        .collect();

    let mut report = SweepReport::default();
    for meeting in expired {
        let Some(batch) = build_archival_batch(&contacts, &meeting, now_millis) else {
            report.failed += 1;
            continue;
        };
        match store.apply(user, batch) {
            Ok(()) => {
                report.archived += 1;
                if let Some(contact_id) = meeting.contact_id.as_ref() {
                    if let Some(contact) = contacts.get_mut(contact_id) {
                        append_history(contact, &meeting, now_millis);
                    }
                }
                info!(
                    "event=meeting_archived module=lifecycle status=ok meeting_id={} linked_contact={}",
                    meeting.id,
                    meeting.contact_id.as_deref().unwrap_or("none")
                );
            }
            Err(err) => {
                report.failed += 1;
                error!(
                    "event=meeting_archived module=lifecycle status=error meeting_id={} error={err}",
                    meeting.id
                );
            }
        }
    }
    Ok(report)
}

/// Returns `None` when the updated contact cannot be encoded; the meeting
/// then stays active rather than archive without its history entry.
fn build_archival_batch(
    contacts: &BTreeMap<RecordId, Contact>,
    meeting: &Meeting,
    now_millis: i64,
) -> Option<WriteBatch> {
    let mut batch = WriteBatch::new();

    // Only a resolvable contact gets a history entry. An absent, dangling
    // or free-text reference skips the write and the content is dropped.
    let linked = meeting
        .contact_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .and_then(|id| contacts.get(id));

    if let Some(contact) = linked {
        let mut updated = contact.clone();
        append_history(&mut updated, meeting, now_millis);
        updated.updated_at = now_millis;
        match serde_json::to_value(&updated) {
            Ok(doc) => batch.put(Collection::Contacts, updated.id.clone(), doc),
            Err(err) => {
                error!(
                    "event=meeting_archived module=lifecycle status=error meeting_id={} error={err}",
                    meeting.id
                );
                return None;
            }
        }
    }

    batch.delete(Collection::Meetings, meeting.id.clone());
    Some(batch)
}

fn append_history(contact: &mut Contact, meeting: &Meeting, now_millis: i64) {
    let mut entry_id = record_id_from_millis(now_millis);
    // Several archivals can share one observation millisecond; keep keys
    // unique inside the contact's history map.
    let mut bump = now_millis;
    while contact.meeting_history.contains_key(&entry_id) {
        bump += 1;
        entry_id = record_id_from_millis(bump);
    }
    contact.meeting_history.insert(
        entry_id,
        HistoryEntry {
            topic: meeting.topic.clone(),
            date: meeting.date.clone(),
            time: meeting.time.clone(),
            notes: meeting.notes.clone(),
            archived_at: now_millis,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::{evaluate, MeetingState, GRACE_PERIOD_HOURS};
    use chrono::{Duration, NaiveDateTime};

    fn at(value: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn stays_scheduled_inside_grace_period() {
        let start = at("2024-01-01T10:00:00");
        let grace = Duration::hours(GRACE_PERIOD_HOURS);
        assert_eq!(
            evaluate(Some(start), start + grace - Duration::milliseconds(1)),
            MeetingState::Scheduled
        );
    }

    #[test]
    fn expires_exactly_at_grace_boundary() {
        let start = at("2024-01-01T10:00:00");
        let grace = Duration::hours(GRACE_PERIOD_HOURS);
        assert_eq!(evaluate(Some(start), start + grace), MeetingState::Expired);
    }

    #[test]
    fn unparseable_instant_never_expires() {
        assert_eq!(
            evaluate(None, at("2099-01-01T00:00:00")),
            MeetingState::Scheduled
        );
    }
}
