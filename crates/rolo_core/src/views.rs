//! Live view synchronizer: derived, sorted, filtered projections.
//!
//! # Responsibility
//! - Subscribe to the contact/task/meeting collections and recompute
//!   display projections on every change notification.
//! - Evaluate the meeting lifecycle on the meetings path; archival writes
//!   are the one documented side effect of recomputation.
//!
//! # Invariants
//! - Projections are deterministic functions of the snapshots: meetings
//!   ascend by start instant, tasks ascend by due date with undated tasks
//!   after all dated ones, contacts filter by case-insensitive substring.
//! - Relative order among equal sort keys is the snapshot's insertion
//!   order (stable sorts over insertion-ordered snapshots).

use crate::clock::Clock;
use crate::lifecycle::{self, MeetingState};
use crate::model::contact::Contact;
use crate::model::meeting::Meeting;
use crate::model::task::Task;
use crate::session::UserId;
use crate::store::{decode_snapshot, Collection, EntityStore, Subscription};
use log::{error, info};
use std::cell::RefCell;
use std::rc::Rc;

/// Sorts meetings ascending by start instant. Meetings with unparseable
/// date/time sort after all dated ones.
pub fn sort_meetings(meetings: &mut [Meeting]) {
    meetings.sort_by(|a, b| match (a.instant(), b.instant()) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Sorts tasks ascending by due date; undated tasks keep their relative
/// insertion order after all dated ones.
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| match (a.parsed_due_date(), b.parsed_due_date()) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Case-insensitive substring filter over "first last" or company.
/// An empty (or whitespace) term yields the unfiltered list.
pub fn filter_contacts(contacts: &[Contact], term: &str) -> Vec<Contact> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return contacts.to_vec();
    }
    contacts
        .iter()
        .filter(|contact| {
            contact.full_name().to_lowercase().contains(&needle)
                || contact
                    .company
                    .as_deref()
                    .is_some_and(|company| company.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

#[derive(Debug, Default)]
struct ViewState {
    contacts: Vec<Contact>,
    tasks: Vec<Task>,
    meetings: Vec<Meeting>,
    search_term: String,
}

/// Live projections over one user's data.
///
/// Holds the three collection subscriptions; dropping the value detaches
/// them. All recomputation happens synchronously inside store callbacks.
pub struct LiveViews {
    state: Rc<RefCell<ViewState>>,
    _subscriptions: Vec<Subscription>,
}

impl LiveViews {
    /// Attaches to the store and primes every projection from the initial
    /// snapshots, running an archival sweep if the meetings snapshot
    /// already contains expired records.
    pub fn attach<S, C>(store: Rc<S>, clock: Rc<C>, user: UserId) -> Self
    where
        S: EntityStore + 'static,
        C: Clock + 'static,
    {
        let state = Rc::new(RefCell::new(ViewState::default()));
        let mut subscriptions = Vec::with_capacity(3);

        let contacts_state = Rc::clone(&state);
        subscriptions.push(store.subscribe(
            &user,
            Collection::Contacts,
            Box::new(move |snap| {
                contacts_state.borrow_mut().contacts = decode_snapshot(&snap.records);
            }),
        ));

        let tasks_state = Rc::clone(&state);
        subscriptions.push(store.subscribe(
            &user,
            Collection::Tasks,
            Box::new(move |snap| {
                let mut tasks: Vec<Task> = decode_snapshot(&snap.records);
                sort_tasks(&mut tasks);
                tasks_state.borrow_mut().tasks = tasks;
            }),
        ));

        let meetings_state = Rc::clone(&state);
        let sweep_store = Rc::clone(&store);
        let sweep_user = user.clone();
        subscriptions.push(store.subscribe(
            &user,
            Collection::Meetings,
            Box::new(move |snap| {
                let mut meetings: Vec<Meeting> = decode_snapshot(&snap.records);
                let now = clock.now();

                let any_expired = meetings
                    .iter()
                    .any(|m| lifecycle::evaluate(m.instant(), now) == MeetingState::Expired);
                if any_expired {
                    // The resulting deletions notify this same subscription
                    // again once the current callback returns.
                    match lifecycle::sweep_expired(
                        sweep_store.as_ref(),
                        &sweep_user,
                        now,
                        clock.epoch_millis(),
                    ) {
                        Ok(report) => info!(
                            "event=lifecycle_sweep module=views status=ok archived={} failed={}",
                            report.archived, report.failed
                        ),
                        Err(err) => error!(
                            "event=lifecycle_sweep module=views status=error error={err}"
                        ),
                    }
                }

                sort_meetings(&mut meetings);
                meetings_state.borrow_mut().meetings = meetings;
            }),
        ));

        Self {
            state,
            _subscriptions: subscriptions,
        }
    }

    /// Active meetings, ascending by start instant.
    pub fn meetings(&self) -> Vec<Meeting> {
        self.state.borrow().meetings.clone()
    }

    /// Open tasks, dated first ascending, undated in insertion order.
    pub fn tasks(&self) -> Vec<Task> {
        self.state.borrow().tasks.clone()
    }

    /// Contacts matching the current search term.
    pub fn contacts(&self) -> Vec<Contact> {
        let state = self.state.borrow();
        filter_contacts(&state.contacts, &state.search_term)
    }

    pub fn set_search_term(&self, term: impl Into<String>) {
        self.state.borrow_mut().search_term = term.into();
    }
}
