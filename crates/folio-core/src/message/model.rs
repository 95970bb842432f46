//! Contact message data models.

use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Opaque identifier of a contact message.
///
/// The backend may send ids as JSON strings or numbers; both are kept in
/// their textual form so they can be used as storage keys and URL segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Creates an id from its textual form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the textual form of the id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for MessageId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Number(n) => Self(n.to_string()),
        })
    }
}

/// Treats an explicit JSON `null` like a missing string.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A contact-form submission as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique identifier.
    pub id: MessageId,
    /// Sender name.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    /// Sender email address.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    /// Sender phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Purpose/category label picked on the contact form.
    #[serde(default, alias = "category", deserialize_with = "null_as_empty")]
    pub purpose: String,
    /// Free-text body.
    #[serde(rename = "message", default, deserialize_with = "null_as_empty")]
    pub body: String,
    /// Creation timestamp (ISO-8601).
    #[serde(default, deserialize_with = "null_as_empty")]
    pub created_at: String,
    /// Whether an admin has seen the message.
    #[serde(default)]
    pub is_seen: bool,
    /// Origin IP address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

impl Message {
    /// Parses `created_at` into a UTC timestamp.
    ///
    /// Accepts RFC 3339 and the offset-less `YYYY-MM-DDTHH:MM:SS[.fff]` form
    /// (interpreted as UTC). Returns `None` for anything else.
    #[must_use]
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }

    /// Case-insensitive substring match over name, email, body and category.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        [&self.name, &self.email, &self.body, &self.purpose]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }

    /// Short single-line preview of the body.
    #[must_use]
    pub fn snippet(&self, max_chars: usize) -> String {
        let flat: String = self.body.split_whitespace().collect::<Vec<_>>().join(" ");
        if flat.chars().count() <= max_chars {
            return flat;
        }
        let mut cut: String = flat.chars().take(max_chars.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Formats an ISO-8601 timestamp in local time.
///
/// Returns the original string if it cannot be parsed.
#[must_use]
pub fn format_timestamp(raw: &str) -> String {
    parse_timestamp(raw).map_or_else(
        || raw.to_string(),
        |dt| {
            let local: DateTime<Local> = dt.with_timezone(&Local);
            local.format("%a, %d %b %Y %H:%M:%S").to_string()
        },
    )
}
