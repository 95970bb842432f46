//! Pure derivations over the message set: ordering, filtering, windowing.

use std::cmp::Reverse;
use std::collections::HashSet;

use crate::message::{Message, MessageId};

/// Category filter for the inbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Filter {
    /// Every message.
    #[default]
    All,
    /// Messages not yet seen.
    Unread,
    /// Messages already seen.
    Read,
    /// Locally starred messages.
    Starred,
}

impl Filter {
    /// All filters in display order.
    pub const ALL: [Self; 4] = [Self::All, Self::Unread, Self::Read, Self::Starred];

    /// Parse from its string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "all" => Some(Self::All),
            "unread" => Some(Self::Unread),
            "read" => Some(Self::Read),
            "starred" | "favorites" => Some(Self::Starred),
            _ => None,
        }
    }

    /// String representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Unread => "unread",
            Self::Read => "read",
            Self::Starred => "starred",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Unread => "Unread",
            Self::Read => "Read",
            Self::Starred => "Starred",
        }
    }

    /// Whether `message` passes this filter.
    pub fn matches(self, message: &Message, is_starred: impl Fn(&MessageId) -> bool) -> bool {
        match self {
            Self::All => true,
            Self::Unread => !message.is_seen,
            Self::Read => message.is_seen,
            Self::Starred => is_starred(&message.id),
        }
    }
}

/// Whether `message` matches the free-text search.
///
/// Blank queries match everything. The query is lowercased but not trimmed.
#[must_use]
pub fn matches_search(message: &Message, query: &str) -> bool {
    if query.trim().is_empty() {
        return true;
    }
    message.matches_lowercase(&query.to_lowercase())
}

/// Applies the category filter, then the search, preserving order.
pub fn filter_messages<'a>(
    messages: &'a [Message],
    filter: Filter,
    query: &str,
    is_starred: impl Fn(&MessageId) -> bool,
) -> Vec<&'a Message> {
    messages
        .iter()
        .filter(|m| filter.matches(m, &is_starred))
        .filter(|m| matches_search(m, query))
        .collect()
}

/// The first `visible` items, or all of them if there are fewer.
#[must_use]
pub fn window<T>(items: &[T], visible: usize) -> &[T] {
    &items[..visible.min(items.len())]
}

/// Stable sort by creation time, newest first. Unparseable timestamps go last.
pub fn sort_newest_first(messages: &mut [Message]) {
    messages.sort_by_cached_key(|m| Reverse(m.created_at_utc()));
}

/// Drops every message whose id was already seen earlier in the list.
#[must_use]
pub fn dedupe_by_id(messages: Vec<Message>) -> Vec<Message> {
    let mut seen = HashSet::with_capacity(messages.len());
    messages
        .into_iter()
        .filter(|m| seen.insert(m.id.clone()))
        .collect()
}
