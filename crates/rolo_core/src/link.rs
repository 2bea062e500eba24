//! Referential linking between records.
//!
//! # Responsibility
//! - Resolve a weak contact reference (a contact ID, free text, or nothing)
//!   to a display result.
//!
//! # Invariants
//! - Resolution is total: any input maps to exactly one of the three
//!   variants and never fails. A dangling or free-text reference is a
//!   value, not an error.
//! - Free text ("LinkedIn", "Dad") must stay distinguishable from "no
//!   reference at all"; collapsing the two loses user data.

use crate::model::contact::Contact;

/// Outcome of resolving a weak contact reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedReference<'a> {
    /// The reference was absent or empty.
    NoReference,
    /// The reference matched a tracked contact's ID.
    Contact(&'a Contact),
    /// The reference matched nothing: free-form annotation or a dangling
    /// ID left behind by a deleted contact.
    Custom(&'a str),
}

/// Resolves `reference` against the current contact list.
pub fn resolve_reference<'a>(
    contacts: &'a [Contact],
    reference: Option<&'a str>,
) -> ResolvedReference<'a> {
    let Some(reference) = reference else {
        return ResolvedReference::NoReference;
    };
    if reference.is_empty() {
        return ResolvedReference::NoReference;
    }
    match contacts.iter().find(|contact| contact.id == reference) {
        Some(contact) => ResolvedReference::Contact(contact),
        None => ResolvedReference::Custom(reference),
    }
}

/// Label for a meeting card's contact line.
pub fn meeting_contact_label(contacts: &[Contact], reference: Option<&str>) -> String {
    match resolve_reference(contacts, reference) {
        ResolvedReference::NoReference => "No contact".to_string(),
        ResolvedReference::Contact(contact) => contact.full_name(),
        ResolvedReference::Custom(_) => "Unknown contact".to_string(),
    }
}

/// Label for a task card's contact line; tasks show nothing when the
/// reference is absent or dangling.
pub fn task_contact_label(contacts: &[Contact], reference: Option<&str>) -> Option<String> {
    match resolve_reference(contacts, reference) {
        ResolvedReference::Contact(contact) => Some(contact.short_name()),
        _ => None,
    }
}

/// Label for a contact's "introduced by" line. Free text is shown as
/// entered; a dangling ID also falls through here as its raw value.
pub fn referral_label<'a>(contacts: &'a [Contact], reference: Option<&'a str>) -> Option<String> {
    match resolve_reference(contacts, reference) {
        ResolvedReference::NoReference => None,
        ResolvedReference::Contact(contact) => Some(contact.full_name()),
        ResolvedReference::Custom(text) => Some(text.to_string()),
    }
}
