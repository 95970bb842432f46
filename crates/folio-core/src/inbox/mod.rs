//! Admin inbox view state.
//!
//! [`InboxState`] owns the local copy of the message collection and
//! everything derived from it: filter, search, visible window, preview,
//! selection, favorites and in-flight mutations. It is a pure state machine;
//! [`InboxController`] runs the remote effects it asks for.

mod action;
mod controller;
mod mutation;
mod navigation;
mod state;
mod view;

pub use action::{Action, DeleteScope, Effect, Notice, NoticeLevel};
pub use controller::{InboxController, perform, save_favorites};
pub use mutation::{MutationKind, MutationPhase, MutationTable};
pub use navigation::{Direction, next_index};
pub use state::InboxState;
pub use view::{Filter, dedupe_by_id, filter_messages, matches_search, sort_newest_first, window};
