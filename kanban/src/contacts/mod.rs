//! Contact directory and assignee resolution.
//!
//! The [`Directory`] is a read-only index over one contact snapshot. It is
//! rebuilt wholesale whenever the contact set changes and never patched in
//! place, so there is no window in which the three maps disagree.

pub mod resolve;

use std::collections::HashMap;

use kanban_proto::contact::{Contact, RawContact};
use serde_json::Value;

pub use resolve::{AssigneeRef, ContactRef, resolve, resolve_contacts, resolve_text};

/// Lookup indices derived from a contact snapshot.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    by_id: HashMap<String, Contact>,
    by_name: HashMap<String, String>,
    by_email: HashMap<String, String>,
}

/// Normalizes a name or email for lookup: trimmed and lowercased.
#[must_use]
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl Directory {
    /// Builds the directory from a contacts snapshot (`id → RawContact`).
    ///
    /// `None`, `null` and non-object snapshots yield an empty directory.
    /// Entries that are not objects are skipped and appear in none of the
    /// three maps.
    #[must_use]
    pub fn build(snapshot: Option<&Value>) -> Self {
        let Some(entries) = snapshot.and_then(Value::as_object) else {
            return Self::default();
        };
        let directory = Self::from_contacts(entries.iter().filter_map(|(id, raw)| {
            let parsed = RawContact::from_wire(raw);
            if parsed.is_none() {
                tracing::debug!(contact_id = %id, "skipping malformed contact entry");
            }
            parsed.map(|raw| (id.clone(), raw))
        }));
        tracing::debug!(contacts = directory.len(), "contact directory rebuilt");
        directory
    }

    /// Builds the directory from already-parsed records.
    ///
    /// When several contacts share a normalized name or email, the one
    /// inserted last wins.
    pub fn from_contacts<I>(contacts: I) -> Self
    where
        I: IntoIterator<Item = (String, RawContact)>,
    {
        let mut directory = Self::default();
        for (id, raw) in contacts {
            let contact = Contact::from_raw(&id, raw);
            if !contact.name.trim().is_empty() {
                directory
                    .by_name
                    .insert(normalize_key(&contact.name), id.clone());
            }
            if !contact.email.trim().is_empty() {
                directory
                    .by_email
                    .insert(normalize_key(&contact.email), id.clone());
            }
            directory.by_id.insert(id, contact);
        }
        directory
    }

    /// Looks up a contact by canonical id.
    #[must_use]
    pub fn contact(&self, id: &str) -> Option<&Contact> {
        self.by_id.get(id)
    }

    /// Whether the canonical id is known.
    #[must_use]
    pub fn contains_id(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Canonical id for a name, matched case-insensitively.
    #[must_use]
    pub fn id_for_name(&self, name: &str) -> Option<&str> {
        self.by_name.get(&normalize_key(name)).map(String::as_str)
    }

    /// Canonical id for an email, matched case-insensitively.
    #[must_use]
    pub fn id_for_email(&self, email: &str) -> Option<&str> {
        self.by_email.get(&normalize_key(email)).map(String::as_str)
    }

    /// Number of contacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the directory holds no contacts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Number of indexed names.
    #[must_use]
    pub fn name_count(&self) -> usize {
        self.by_name.len()
    }

    /// Number of indexed emails.
    #[must_use]
    pub fn email_count(&self) -> usize {
        self.by_email.len()
    }

    /// All contacts sorted by name, then id.
    #[must_use]
    pub fn contacts(&self) -> Vec<&Contact> {
        let mut all: Vec<&Contact> = self.by_id.values().collect();
        all.sort_by(|a, b| {
            normalize_key(&a.name)
                .cmp(&normalize_key(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });
        all
    }
}
