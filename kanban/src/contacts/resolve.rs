//! Lenient assignee resolution.
//!
//! Stored assignee fields come in every shape the board has ever written:
//! a contact id, an email, a display name, a comma-separated list of any of
//! those, an array mixing strings and contact snapshots, or a single
//! snapshot object. Each entry is classified into an [`AssigneeRef`] and
//! resolved through one exhaustive match. Entries that do not resolve are
//! dropped; resolution never fails.

use std::collections::HashSet;

use kanban_proto::contact::Contact;
use serde_json::{Map, Value};

use super::Directory;

/// One reference to a contact, in whatever form it was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssigneeRef {
    /// A canonical contact id.
    Id(String),
    /// An email address.
    Email(String),
    /// A display name.
    Name(String),
    /// A contact snapshot object.
    Raw(ContactRef),
}

/// The identifying fields of a stored contact snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactRef {
    /// `id` or `contactId`.
    pub id: Option<String>,
    /// `email`.
    pub email: Option<String>,
    /// `name`.
    pub name: Option<String>,
}

impl ContactRef {
    /// Extracts the identifying fields, or `None` if the object has none.
    fn from_object(obj: &Map<String, Value>) -> Option<Self> {
        let field = |key: &str| {
            obj.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };
        let found = Self {
            id: field("id").or_else(|| field("contactId")),
            email: field("email"),
            name: field("name"),
        };
        (found != Self::default()).then_some(found)
    }

    /// Resolves by precedence: id, then email, then name.
    fn resolve(&self, directory: &Directory) -> Option<String> {
        self.id
            .as_deref()
            .filter(|id| directory.contains_id(id))
            .or_else(|| {
                self.email
                    .as_deref()
                    .and_then(|email| directory.id_for_email(email))
            })
            .or_else(|| {
                self.name
                    .as_deref()
                    .and_then(|name| directory.id_for_name(name))
            })
            .map(String::from)
    }
}

impl AssigneeRef {
    /// Classifies a single text token.
    ///
    /// A token that is already a known id stays an id; otherwise a token
    /// containing `@` is an email and anything else is a name.
    #[must_use]
    pub fn classify(token: &str, directory: &Directory) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            None
        } else if directory.contains_id(token) {
            Some(Self::Id(token.to_string()))
        } else if token.contains('@') {
            Some(Self::Email(token.to_string()))
        } else {
            Some(Self::Name(token.to_string()))
        }
    }

    /// Flattens a stored assignee value into references, in stored order.
    #[must_use]
    pub fn from_value(value: &Value, directory: &Directory) -> Vec<Self> {
        let mut refs = Vec::new();
        collect_refs(value, directory, &mut refs);
        refs
    }

    /// Resolves this reference to a canonical id.
    #[must_use]
    pub fn resolve(&self, directory: &Directory) -> Option<String> {
        match self {
            Self::Id(id) => directory.contains_id(id).then(|| id.clone()),
            Self::Email(email) => directory.id_for_email(email).map(String::from),
            Self::Name(name) => directory.id_for_name(name).map(String::from),
            Self::Raw(contact) => contact.resolve(directory),
        }
    }
}

fn collect_refs(value: &Value, directory: &Directory, out: &mut Vec<AssigneeRef>) {
    match value {
        Value::String(text) => out.extend(
            text.split(',')
                .filter_map(|token| AssigneeRef::classify(token, directory)),
        ),
        Value::Array(items) => {
            for item in items {
                collect_refs(item, directory, out);
            }
        }
        Value::Object(obj) => {
            if let Some(contact) = ContactRef::from_object(obj) {
                out.push(AssigneeRef::Raw(contact));
            } else {
                // Index-keyed maps are arrays that went through the store.
                for item in obj.values() {
                    collect_refs(item, directory, out);
                }
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Resolves a stored assignee value to canonical contact ids.
///
/// Duplicates are removed, keeping the first occurrence. Unresolvable
/// entries are silently dropped.
#[must_use]
pub fn resolve(raw: &Value, directory: &Directory) -> Vec<String> {
    let mut seen = HashSet::new();
    AssigneeRef::from_value(raw, directory)
        .iter()
        .filter_map(|r| r.resolve(directory))
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Resolves free text typed by the user (names, emails or ids separated
/// by commas).
#[must_use]
pub fn resolve_text(text: &str, directory: &Directory) -> Vec<String> {
    resolve(&Value::String(text.to_string()), directory)
}

/// Resolves a stored assignee value to the contacts themselves.
#[must_use]
pub fn resolve_contacts<'a>(raw: &Value, directory: &'a Directory) -> Vec<&'a Contact> {
    resolve(raw, directory)
        .iter()
        .filter_map(|id| directory.contact(id))
        .collect()
}
