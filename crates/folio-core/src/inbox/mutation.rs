//! Per-message optimistic mutation tracking.
//!
//! Every remote mutation moves a message through
//! `Idle -> Pending -> {Committed | RolledBack}`. A message is busy exactly
//! while it is `Pending`; a second mutation on a busy message is rejected,
//! never queued.

use std::collections::HashMap;

use crate::message::MessageId;

/// What a pending mutation is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Seen flag was flipped locally; `prior` is the value to restore on failure.
    ToggleSeen {
        /// Seen flag before the optimistic flip.
        prior: bool,
    },
    /// Delete requested; nothing changes locally until it succeeds.
    Delete,
}

/// Lifecycle phase of the latest mutation on a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MutationPhase {
    /// No mutation has run since the last fetch.
    #[default]
    Idle,
    /// Waiting for the backend.
    Pending,
    /// The backend confirmed the change.
    Committed,
    /// The backend rejected the change; local state was restored.
    RolledBack,
}

/// Pending mutations plus the outcome of each message's last one.
#[derive(Debug, Default)]
pub struct MutationTable {
    pending: HashMap<MessageId, MutationKind>,
    settled: HashMap<MessageId, MutationPhase>,
}

impl MutationTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` has a mutation in flight.
    #[must_use]
    pub fn is_busy(&self, id: &MessageId) -> bool {
        self.pending.contains_key(id)
    }

    /// Number of mutations in flight.
    #[must_use]
    pub fn busy_count(&self) -> usize {
        self.pending.len()
    }

    /// Moves `id` to `Pending`. Returns `false` if it already was.
    pub fn begin(&mut self, id: &MessageId, kind: MutationKind) -> bool {
        if self.is_busy(id) {
            return false;
        }
        self.pending.insert(id.clone(), kind);
        self.settled.remove(id);
        true
    }

    /// Resolves the pending mutation on `id`.
    ///
    /// Returns the mutation that was pending and the phase it ended in, or
    /// `None` if nothing was pending (a duplicate or stale completion).
    pub fn settle(&mut self, id: &MessageId, ok: bool) -> Option<(MutationKind, MutationPhase)> {
        let kind = self.pending.remove(id)?;
        let phase = if ok {
            MutationPhase::Committed
        } else {
            MutationPhase::RolledBack
        };
        self.settled.insert(id.clone(), phase);
        Some((kind, phase))
    }

    /// Current phase of `id`.
    #[must_use]
    pub fn phase(&self, id: &MessageId) -> MutationPhase {
        if self.is_busy(id) {
            return MutationPhase::Pending;
        }
        self.settled.get(id).copied().unwrap_or_default()
    }

    /// Forgets settled outcomes. Pending mutations are kept.
    pub fn clear_history(&mut self) {
        self.settled.clear();
    }
}
