//! Inbox view state and its update function.

use std::collections::VecDeque;

use tracing::{debug, error, info, warn};

use super::action::{Action, DeleteScope, Effect, Notice};
use super::mutation::{MutationKind, MutationPhase, MutationTable};
use super::navigation::{Direction, next_index};
use super::view::{Filter, dedupe_by_id, filter_messages, sort_newest_first, window};
use crate::favorites::Favorites;
use crate::message::{Message, MessageId};

/// Progress of a running bulk delete.
#[derive(Debug)]
struct BulkDelete {
    /// Ids still to be sent, in order.
    queue: VecDeque<MessageId>,
    /// Ids in this batch.
    total: usize,
    deleted: usize,
    failed: usize,
}

/// Local copy of the message collection plus everything derived from it.
///
/// All changes go through [`InboxState::update`]. Remote work is returned
/// as an [`Effect`]; its outcome must be fed back as the matching
/// `*Settled`/`Loaded` action.
#[derive(Debug)]
pub struct InboxState {
    /// Full set, newest first, unique ids.
    messages: Vec<Message>,
    favorites: Favorites,
    filter: Filter,
    search: String,
    page_chunk: usize,
    visible_count: usize,
    preview: Option<MessageId>,
    preview_open: bool,
    /// Bulk selection in insertion order.
    selection: Vec<MessageId>,
    mutations: MutationTable,
    bulk: Option<BulkDelete>,
    loading: bool,
    load_error: Option<String>,
    notices: Vec<Notice>,
}

impl InboxState {
    /// Creates an empty inbox revealing `page_chunk` messages at a time.
    #[must_use]
    pub fn new(favorites: Favorites, page_chunk: usize) -> Self {
        let page_chunk = page_chunk.max(1);
        Self {
            messages: Vec::new(),
            favorites,
            filter: Filter::All,
            search: String::new(),
            page_chunk,
            visible_count: page_chunk,
            preview: None,
            preview_open: false,
            selection: Vec::new(),
            mutations: MutationTable::new(),
            bulk: None,
            loading: false,
            load_error: None,
            notices: Vec::new(),
        }
    }

    /// Applies an action and returns the remote work it requires.
    pub fn update(&mut self, action: Action) -> Effect {
        match action {
            Action::Refresh => {
                if self.loading {
                    debug!("Refresh ignored: fetch already in flight");
                    return Effect::None;
                }
                self.loading = true;
                self.load_error = None;
                return Effect::FetchAll;
            }
            Action::Loaded(result) => self.apply_loaded(result),
            Action::SetFilter(filter) => {
                self.filter = filter;
                self.visible_count = self.page_chunk;
            }
            Action::SetSearch(search) => {
                self.search = search;
                self.visible_count = self.page_chunk;
            }
            Action::RevealMore => {
                let len = self.filtered().len();
                if self.visible_count < len {
                    self.visible_count = (self.visible_count + self.page_chunk).min(len);
                }
            }
            Action::OpenPreview(id) => {
                if self.message(&id).is_some() {
                    self.preview = Some(id);
                    self.preview_open = true;
                } else {
                    debug!("Preview ignored: unknown message {id}");
                }
            }
            Action::ClosePreview => {
                self.preview_open = false;
            }
            Action::Navigate(direction) => self.navigate(direction),
            Action::ToggleSelect(id) => {
                if let Some(pos) = self.selection.iter().position(|s| *s == id) {
                    self.selection.remove(pos);
                } else {
                    self.selection.push(id);
                }
            }
            Action::SelectAllVisible => {
                self.selection = self.visible().iter().map(|m| m.id.clone()).collect();
            }
            Action::ClearSelection => {
                self.selection.clear();
            }
            Action::ToggleFavorite(id) => {
                let starred = self.favorites.toggle(&id);
                debug!("Message {id} starred={starred}");
            }
            Action::BulkToggleFavorite => self.bulk_toggle_favorite(),
            Action::ToggleSeen(id) => return self.begin_toggle_seen(id),
            Action::BulkToggleSeen => return self.begin_bulk_toggle_seen(),
            Action::SeenSettled { id, result } => self.settle_seen(&id, result),
            Action::Delete(id) => return self.begin_delete(id),
            Action::BulkDelete => return self.begin_bulk_delete(),
            Action::DeleteSettled { id, scope, result } => {
                return self.settle_delete(&id, scope, result);
            }
        }
        Effect::None
    }

    fn apply_loaded(&mut self, result: Result<Vec<Message>, String>) {
        self.loading = false;
        match result {
            Ok(fetched) => {
                let fetched_len = fetched.len();
                let mut messages = dedupe_by_id(fetched);
                if messages.len() != fetched_len {
                    warn!(
                        "Dropped {} duplicate message ids from fetch",
                        fetched_len - messages.len()
                    );
                }
                sort_newest_first(&mut messages);
                info!("Loaded {} messages", messages.len());

                self.messages = messages;
                self.load_error = None;
                self.visible_count = self.page_chunk;
                self.preview = None;
                self.preview_open = false;
                self.mutations.clear_history();
                let messages = &self.messages;
                self.selection
                    .retain(|id| messages.iter().any(|m| m.id == *id));
            }
            Err(e) => {
                error!("Failed to fetch messages: {e}");
                self.messages.clear();
                self.load_error = Some(e);
                self.notices.push(Notice::error("Failed to load messages"));
            }
        }
    }

    fn navigate(&mut self, direction: Direction) {
        let (target, index) = {
            let filtered = self.filtered();
            let current = self
                .preview
                .as_ref()
                .and_then(|id| filtered.iter().position(|m| m.id == *id));
            let Some(index) = next_index(filtered.len(), current, direction) else {
                return;
            };
            (filtered[index].id.clone(), index)
        };

        if index >= self.visible_count {
            self.visible_count = index + 1;
        }
        self.preview = Some(target);
        self.preview_open = true;
    }

    fn begin_toggle_seen(&mut self, id: MessageId) -> Effect {
        if self.mutations.is_busy(&id) {
            debug!("Toggle seen ignored: {id} is busy");
            return Effect::None;
        }
        let Some(message) = self.messages.iter_mut().find(|m| m.id == id) else {
            debug!("Toggle seen ignored: unknown message {id}");
            return Effect::None;
        };
        let prior = message.is_seen;
        message.is_seen = !prior;
        self.mutations
            .begin(&id, MutationKind::ToggleSeen { prior });
        Effect::MarkSeen(id)
    }

    /// Stars the whole selection if any of it is unstarred, else unstars it.
    fn bulk_toggle_favorite(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        let star = self.selection.iter().any(|id| !self.favorites.contains(id));
        self.favorites.set_all(&self.selection, star);
        debug!(
            "Bulk {} {} messages",
            if star { "starred" } else { "unstarred" },
            self.selection.len()
        );
    }

    /// Flips every selected message that is not already in the target state.
    ///
    /// The target is unread when at least half of the selection is read, and
    /// read otherwise. Busy ids are skipped.
    fn begin_bulk_toggle_seen(&mut self) -> Effect {
        let selected: Vec<(MessageId, bool)> = self
            .selection
            .iter()
            .filter_map(|id| self.message(id).map(|m| (id.clone(), m.is_seen)))
            .collect();
        if selected.is_empty() {
            return Effect::None;
        }
        let read = selected.iter().filter(|(_, seen)| *seen).count();
        let target = read * 2 < selected.len();

        let effects: Vec<Effect> = selected
            .into_iter()
            .filter(|(_, seen)| *seen != target)
            .map(|(id, _)| self.begin_toggle_seen(id))
            .filter(|effect| !effect.is_none())
            .collect();
        if effects.is_empty() {
            return Effect::None;
        }
        info!(
            "Marking {} messages {}",
            effects.len(),
            if target { "read" } else { "unread" }
        );
        Effect::Batch(effects)
    }

    fn settle_seen(&mut self, id: &MessageId, result: Result<(), String>) {
        let Some((kind, _)) = self.mutations.settle(id, result.is_ok()) else {
            debug!("Ignoring stale mark-seen completion for {id}");
            return;
        };
        if let Err(e) = result {
            warn!("Mark seen failed for {id}: {e}");
            if let MutationKind::ToggleSeen { prior } = kind
                && let Some(message) = self.messages.iter_mut().find(|m| m.id == *id)
            {
                message.is_seen = prior;
            }
            self.notices
                .push(Notice::error(format!("Could not update message: {e}")));
        }
    }

    fn begin_delete(&mut self, id: MessageId) -> Effect {
        if self.mutations.is_busy(&id) {
            debug!("Delete ignored: {id} is busy");
            return Effect::None;
        }
        if self.message(&id).is_none() {
            debug!("Delete ignored: unknown message {id}");
            return Effect::None;
        }
        self.mutations.begin(&id, MutationKind::Delete);
        Effect::Delete {
            id,
            scope: DeleteScope::Single,
        }
    }

    fn begin_bulk_delete(&mut self) -> Effect {
        if self.bulk.is_some() {
            debug!("Bulk delete ignored: a batch is already running");
            return Effect::None;
        }
        let mut queue = VecDeque::new();
        for id in &self.selection {
            if self.mutations.begin(id, MutationKind::Delete) {
                queue.push_back(id.clone());
            } else {
                debug!("Bulk delete skipping busy message {id}");
            }
        }
        if queue.is_empty() {
            return Effect::None;
        }
        info!("Bulk deleting {} messages", queue.len());
        self.bulk = Some(BulkDelete {
            total: queue.len(),
            queue,
            deleted: 0,
            failed: 0,
        });
        self.next_bulk_step()
    }

    fn settle_delete(
        &mut self,
        id: &MessageId,
        scope: DeleteScope,
        result: Result<(), String>,
    ) -> Effect {
        if self.mutations.settle(id, result.is_ok()).is_none() {
            debug!("Ignoring stale delete completion for {id}");
            return Effect::None;
        }

        match &result {
            Ok(()) => {
                self.remove_message(id);
                if scope == DeleteScope::Single {
                    self.selection.retain(|s| s != id);
                    if self.preview.as_ref() == Some(id) {
                        self.preview = None;
                        self.preview_open = false;
                    }
                    self.notices.push(Notice::info("Message deleted"));
                }
            }
            Err(e) => {
                warn!("Delete failed for {id}: {e}");
                if scope == DeleteScope::Single {
                    self.notices
                        .push(Notice::error(format!("Could not delete message: {e}")));
                }
            }
        }

        match scope {
            DeleteScope::Single => Effect::None,
            DeleteScope::Batch => {
                if let Some(bulk) = self.bulk.as_mut() {
                    if result.is_ok() {
                        bulk.deleted += 1;
                    } else {
                        bulk.failed += 1;
                    }
                }
                self.next_bulk_step()
            }
        }
    }

    /// Sends the next queued delete, or wraps the batch up.
    fn next_bulk_step(&mut self) -> Effect {
        let Some(bulk) = self.bulk.as_mut() else {
            return Effect::None;
        };
        if let Some(id) = bulk.queue.pop_front() {
            return Effect::Delete {
                id,
                scope: DeleteScope::Batch,
            };
        }

        let BulkDelete {
            total,
            deleted,
            failed,
            ..
        } = *bulk;
        self.bulk = None;
        self.selection.clear();
        self.preview = None;
        self.preview_open = false;

        info!("Bulk delete finished: {deleted}/{total} deleted, {failed} failed");
        if failed == 0 {
            self.notices
                .push(Notice::info(format!("Deleted {deleted} messages")));
        } else {
            self.notices.push(Notice::error(format!(
                "Deleted {deleted} of {total} messages; {failed} failed"
            )));
        }
        Effect::None
    }

    fn remove_message(&mut self, id: &MessageId) {
        self.messages.retain(|m| m.id != *id);
        self.favorites.remove(id);
    }

    // --- Read-only views ---

    /// Full message set, newest first.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Looks a message up by id.
    #[must_use]
    pub fn message(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == *id)
    }

    /// Messages passing the current filter and search, in order.
    #[must_use]
    pub fn filtered(&self) -> Vec<&Message> {
        filter_messages(&self.messages, self.filter, &self.search, |id| {
            self.favorites.contains(id)
        })
    }

    /// The revealed prefix of [`filtered`](Self::filtered).
    #[must_use]
    pub fn visible(&self) -> Vec<&Message> {
        let filtered = self.filtered();
        window(&filtered, self.visible_count).to_vec()
    }

    /// Whether more filtered messages exist beyond the window.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.visible_count < self.filtered().len()
    }

    /// Window size cursor.
    #[must_use]
    pub const fn visible_count(&self) -> usize {
        self.visible_count
    }

    /// Messages revealed per chunk.
    #[must_use]
    pub const fn page_chunk(&self) -> usize {
        self.page_chunk
    }

    /// Number of messages in the full set.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.messages.len()
    }

    /// Number of unseen messages in the full set.
    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.messages.iter().filter(|m| !m.is_seen).count()
    }

    /// Active category filter.
    #[must_use]
    pub const fn filter(&self) -> Filter {
        self.filter
    }

    /// Active search text.
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Id of the previewed message.
    #[must_use]
    pub const fn preview(&self) -> Option<&MessageId> {
        self.preview.as_ref()
    }

    /// The previewed message, if it still exists.
    #[must_use]
    pub fn preview_message(&self) -> Option<&Message> {
        self.preview.as_ref().and_then(|id| self.message(id))
    }

    /// Whether the preview surface is open.
    #[must_use]
    pub const fn is_preview_open(&self) -> bool {
        self.preview_open
    }

    /// Ids selected for bulk action, in selection order.
    #[must_use]
    pub fn selection(&self) -> &[MessageId] {
        &self.selection
    }

    /// Whether `id` is selected for bulk action.
    #[must_use]
    pub fn is_selected(&self, id: &MessageId) -> bool {
        self.selection.contains(id)
    }

    /// Whether `id` has a remote mutation in flight.
    #[must_use]
    pub fn is_busy(&self, id: &MessageId) -> bool {
        self.mutations.is_busy(id)
    }

    /// Number of ids with a remote mutation in flight.
    #[must_use]
    pub fn busy_count(&self) -> usize {
        self.mutations.busy_count()
    }

    /// Phase of the latest mutation on `id`.
    #[must_use]
    pub fn mutation_phase(&self, id: &MessageId) -> MutationPhase {
        self.mutations.phase(id)
    }

    /// Whether a bulk delete is running.
    #[must_use]
    pub const fn is_bulk_deleting(&self) -> bool {
        self.bulk.is_some()
    }

    /// Whether `id` is starred.
    #[must_use]
    pub fn is_starred(&self, id: &MessageId) -> bool {
        self.favorites.contains(id)
    }

    /// Starred ids.
    #[must_use]
    pub const fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    /// Starred ids, for saving pending changes.
    pub const fn favorites_mut(&mut self) -> &mut Favorites {
        &mut self.favorites
    }

    /// Whether a fetch is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Error from the last failed fetch.
    #[must_use]
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Removes and returns queued notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
