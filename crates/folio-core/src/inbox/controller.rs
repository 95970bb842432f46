//! Drives [`InboxState`] against a [`MessageGateway`].

use std::collections::VecDeque;

use tracing::{debug, warn};

use super::action::{Action, Effect};
use super::state::InboxState;
use crate::favorites::Favorites;
use crate::gateway::MessageGateway;
use crate::storage::KeyValueStore;

/// Runs one effect and returns the actions carrying its outcome.
///
/// The parts of a [`Effect::Batch`] run one after another. Errors are turned
/// into display strings so they can travel inside an [`Action`].
pub async fn perform<G: MessageGateway>(gateway: &G, effect: Effect) -> Vec<Action> {
    let mut actions = Vec::new();
    for leaf in effect.into_leaves() {
        let action = match leaf {
            Effect::None | Effect::Batch(_) => continue,
            Effect::FetchAll => {
                Action::Loaded(gateway.list_messages().await.map_err(|e| e.to_string()))
            }
            Effect::MarkSeen(id) => {
                let result = gateway.mark_seen(&id).await.map_err(|e| e.to_string());
                Action::SeenSettled { id, result }
            }
            Effect::Delete { id, scope } => {
                let result = gateway.delete_message(&id).await.map_err(|e| e.to_string());
                Action::DeleteSettled { id, scope, result }
            }
        };
        actions.push(action);
    }
    actions
}

/// Inbox state paired with the gateway that serves its effects and the
/// store that keeps its favorites.
#[derive(Debug)]
pub struct InboxController<G, S> {
    state: InboxState,
    gateway: G,
    store: S,
}

impl<G: MessageGateway, S: KeyValueStore> InboxController<G, S> {
    /// Creates a controller.
    pub const fn new(state: InboxState, gateway: G, store: S) -> Self {
        Self {
            state,
            gateway,
            store,
        }
    }

    /// Creates a controller with favorites loaded from `store`.
    pub async fn open(gateway: G, store: S, page_chunk: usize) -> Self {
        let favorites = Favorites::load(&store).await;
        Self::new(InboxState::new(favorites, page_chunk), gateway, store)
    }

    /// Current state.
    pub const fn state(&self) -> &InboxState {
        &self.state
    }

    /// Mutable state, for draining notices.
    pub const fn state_mut(&mut self) -> &mut InboxState {
        &mut self.state
    }

    /// The gateway.
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// The favorites store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Applies `action` without running the effect it produces. Favorite
    /// changes are saved before returning.
    pub async fn update(&mut self, action: Action) -> Effect {
        let effect = self.state.update(action);
        save_favorites(&mut self.state, &self.store).await;
        effect
    }

    /// Applies `action` and runs effects until the state settles.
    ///
    /// A bulk delete completes inside a single call, one request at a time.
    pub async fn dispatch(&mut self, action: Action) {
        let mut queue = VecDeque::from([self.update(action).await]);
        while let Some(effect) = queue.pop_front() {
            if effect.is_none() {
                continue;
            }
            debug!("Running effect {effect:?}");
            for next in perform(&self.gateway, effect).await {
                queue.push_back(self.update(next).await);
            }
        }
    }

    /// Consumes the controller, returning its parts.
    pub fn into_parts(self) -> (InboxState, G, S) {
        (self.state, self.gateway, self.store)
    }
}

/// Saves pending favorite changes. Failures are logged and retried on the
/// next save; the in-memory set stays authoritative.
pub async fn save_favorites<S: KeyValueStore>(state: &mut InboxState, store: &S) {
    if let Err(e) = state.favorites_mut().save(store).await {
        warn!("Failed to persist favorites: {e}");
    }
}
