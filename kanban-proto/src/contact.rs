//! Contact wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Initials shown for a contact that has none.
pub const DEFAULT_INITIALS: &str = "?";

/// Color used for a contact that has none.
pub const DEFAULT_COLOR: &str = "#999";

/// A contact record as stored under `contacts/{id}`.
///
/// Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawContact {
    /// Display name.
    pub name: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Precomputed initials.
    pub initials: Option<String>,
    /// Badge color.
    pub color: Option<String>,
}

impl RawContact {
    /// Parses a stored contact. Returns `None` for anything that is not an
    /// object, including `null`.
    #[must_use]
    pub fn from_wire(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let field = |key: &str| {
            obj.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };
        Some(Self {
            name: field("name"),
            email: field("email"),
            phone: field("phone"),
            initials: field("initials"),
            color: field("color"),
        })
    }
}

/// A contact ready for display, with defaults filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Store-assigned identifier. Immutable once created.
    pub id: String,
    /// Display name, empty if unknown.
    pub name: String,
    /// Email address, empty if unknown.
    pub email: String,
    /// Phone number, empty if unknown.
    pub phone: String,
    /// Badge initials, `"?"` if unknown.
    pub initials: String,
    /// Badge color, `#999` if unknown.
    pub color: String,
}

impl Contact {
    /// Derives the display contact from a stored record.
    #[must_use]
    pub fn from_raw(id: &str, raw: RawContact) -> Self {
        Self {
            id: id.to_string(),
            name: raw.name.unwrap_or_default(),
            email: raw.email.unwrap_or_default(),
            phone: raw.phone.unwrap_or_default(),
            initials: raw
                .initials
                .unwrap_or_else(|| DEFAULT_INITIALS.to_string()),
            color: raw.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        }
    }
}
