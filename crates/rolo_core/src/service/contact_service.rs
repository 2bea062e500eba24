//! Contact use-case service.
//!
//! # Invariants
//! - Deleting a contact does not cascade: tasks, meetings and referrals
//!   pointing at it keep their reference and degrade to fallback display.
//!   Weak references are a feature, not an integrity fault.

use crate::clock::Clock;
use crate::model::contact::Contact;
use crate::model::{record_id_from_millis, RecordId};
use crate::service::{decode_strict, normalize_optional, ServiceError, ServiceResult};
use crate::session::UserId;
use crate::store::{Collection, EntityStore};
use log::info;
use std::collections::BTreeMap;

/// Request model for creating a contact.
#[derive(Debug, Clone, Default)]
pub struct NewContact {
    pub first_name: String,
    pub last_name: String,
    pub company: Option<String>,
    /// Another contact's ID, or free text such as "LinkedIn".
    pub referred_by: Option<String>,
}

/// CRUD entry points for the contacts collection.
pub struct ContactService<'a, S: EntityStore + ?Sized> {
    store: &'a S,
    clock: &'a dyn Clock,
    user: UserId,
}

impl<'a, S: EntityStore + ?Sized> ContactService<'a, S> {
    pub fn new(store: &'a S, clock: &'a dyn Clock, user: UserId) -> Self {
        Self { store, clock, user }
    }

    /// Creates a contact with an empty meeting history.
    pub fn add(&self, request: NewContact) -> ServiceResult<Contact> {
        let now_millis = self.clock.epoch_millis();
        let contact = Contact {
            id: record_id_from_millis(now_millis),
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            company: normalize_optional(request.company),
            referred_by: normalize_optional(request.referred_by),
            meeting_history: BTreeMap::new(),
            created_at: now_millis,
            updated_at: now_millis,
        };
        contact.validate()?;

        let doc = serde_json::to_value(&contact).map_err(ServiceError::Encode)?;
        self.store
            .put(&self.user, Collection::Contacts, &contact.id, doc)?;
        info!(
            "event=contact_added module=service status=ok contact_id={}",
            contact.id
        );
        Ok(contact)
    }

    /// Replaces an existing contact record. The whole record is written in
    /// one put; concurrent edits resolve last-write-wins.
    pub fn update(&self, mut contact: Contact) -> ServiceResult<Contact> {
        contact.validate()?;
        let exists = self
            .store
            .get(&self.user, Collection::Contacts)?
            .iter()
            .any(|(id, _)| *id == contact.id);
        if !exists {
            return Err(ServiceError::NotFound(contact.id));
        }

        contact.updated_at = self.clock.epoch_millis();
        let doc = serde_json::to_value(&contact).map_err(ServiceError::Encode)?;
        self.store
            .put(&self.user, Collection::Contacts, &contact.id, doc)?;
        Ok(contact)
    }

    /// Removes a contact. References held by other records are left
    /// dangling on purpose.
    pub fn delete(&self, id: &RecordId) -> ServiceResult<()> {
        self.store.delete(&self.user, Collection::Contacts, id)?;
        info!("event=contact_deleted module=service status=ok contact_id={id}");
        Ok(())
    }

    /// All contacts in insertion order, strictly decoded.
    pub fn list(&self) -> ServiceResult<Vec<Contact>> {
        decode_strict(self.store.get(&self.user, Collection::Contacts)?)
    }
}
