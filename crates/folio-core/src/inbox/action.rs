//! Inputs to and outputs from the inbox state.
//!
//! Following the Elm architecture, an [`Action`] is an event that changes
//! state and an [`Effect`] is remote work the state asks for. The outcome of
//! an effect comes back as another action.

use super::navigation::Direction;
use super::view::Filter;
use crate::message::{Message, MessageId};

/// Whether a delete was requested on its own or as part of a bulk delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteScope {
    /// Single delete from the row or preview.
    Single,
    /// One step of a bulk delete over the selection.
    Batch,
}

/// Inbox events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // Loading
    /// Re-fetch the whole collection.
    Refresh,
    /// Fetch finished.
    Loaded(Result<Vec<Message>, String>),

    // View
    /// Change the category filter.
    SetFilter(Filter),
    /// Change the search text.
    SetSearch(String),
    /// Reveal one more chunk (infinite scroll).
    RevealMore,

    // Preview & traversal
    /// Open the preview on a message.
    OpenPreview(MessageId),
    /// Close the preview, keeping the selection.
    ClosePreview,
    /// Move the preview to the next/previous message.
    Navigate(Direction),

    // Multi-select
    /// Add or remove a message from the bulk selection.
    ToggleSelect(MessageId),
    /// Select exactly the visible messages.
    SelectAllVisible,
    /// Empty the bulk selection.
    ClearSelection,

    // Local-only
    /// Star or unstar a message.
    ToggleFavorite(MessageId),
    /// Star every selected message, or unstar them all if all are starred.
    BulkToggleFavorite,

    // Remote mutations
    /// Flip the seen flag optimistically.
    ToggleSeen(MessageId),
    /// Move every selected message to the opposite of the majority's seen
    /// state. At least half read means all go unread.
    BulkToggleSeen,
    /// Mark-seen call finished.
    SeenSettled {
        /// Message the call was for.
        id: MessageId,
        /// Outcome; the error is a display string.
        result: Result<(), String>,
    },
    /// Delete one message. The caller has confirmed.
    Delete(MessageId),
    /// Delete every selected message, one at a time. The caller has confirmed.
    BulkDelete,
    /// Delete call finished.
    DeleteSettled {
        /// Message the call was for.
        id: MessageId,
        /// Single or batch delete.
        scope: DeleteScope,
        /// Outcome; the error is a display string.
        result: Result<(), String>,
    },
}

/// Remote work requested by the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Nothing to do.
    None,
    /// Fetch the whole collection.
    FetchAll,
    /// Call mark-seen for a message.
    MarkSeen(MessageId),
    /// Delete a message.
    Delete {
        /// Message to delete.
        id: MessageId,
        /// Single or batch delete.
        scope: DeleteScope,
    },
    /// Independent effects that may run in any order.
    Batch(Vec<Effect>),
}

impl Effect {
    /// Whether this effect does nothing.
    #[must_use]
    pub fn is_none(&self) -> bool {
        match self {
            Self::None => true,
            Self::Batch(effects) => effects.iter().all(Self::is_none),
            _ => false,
        }
    }

    /// Flattens nested batches and drops no-ops.
    #[must_use]
    pub fn into_leaves(self) -> Vec<Self> {
        match self {
            Self::None => Vec::new(),
            Self::Batch(effects) => effects.into_iter().flat_map(Self::into_leaves).collect(),
            leaf => vec![leaf],
        }
    }
}

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Something completed.
    Info,
    /// Something failed.
    Error,
}

/// Transient notification for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Text to show.
    pub text: String,
}

impl Notice {
    /// Creates an info notice.
    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    /// Creates an error notice.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}
