//! Shared fixtures for inbox integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;

use folio_core::{Error, Favorites, InboxState, Message, MessageGateway, MessageId, Result};

/// In-memory backend that records every call.
#[derive(Debug, Default)]
pub struct FakeGateway {
    /// Collection served by `list_messages`.
    pub messages: RefCell<Vec<Message>>,
    /// Ids whose mutations fail.
    pub failing: RefCell<HashSet<MessageId>>,
    /// Whether `list_messages` fails.
    pub fail_list: RefCell<bool>,
    /// Ids passed to `mark_seen`, in call order.
    pub mark_seen_calls: RefCell<Vec<MessageId>>,
    /// Ids passed to `delete_message`, in call order.
    pub delete_calls: RefCell<Vec<MessageId>>,
}

impl FakeGateway {
    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self {
            messages: RefCell::new(messages),
            ..Self::default()
        }
    }

    pub fn fail_on(self, id: &str) -> Self {
        self.failing.borrow_mut().insert(MessageId::from(id));
        self
    }

    fn check(&self, id: &MessageId) -> Result<()> {
        if self.failing.borrow().contains(id) {
            Err(Error::api(format!("simulated failure for {id}")))
        } else {
            Ok(())
        }
    }
}

impl MessageGateway for FakeGateway {
    async fn list_messages(&self) -> Result<Vec<Message>> {
        if *self.fail_list.borrow() {
            return Err(Error::api("backend unavailable"));
        }
        Ok(self.messages.borrow().clone())
    }

    async fn mark_seen(&self, id: &MessageId) -> Result<()> {
        self.mark_seen_calls.borrow_mut().push(id.clone());
        self.check(id)?;
        if let Some(m) = self.messages.borrow_mut().iter_mut().find(|m| m.id == *id) {
            m.is_seen = !m.is_seen;
        }
        Ok(())
    }

    async fn delete_message(&self, id: &MessageId) -> Result<()> {
        self.delete_calls.borrow_mut().push(id.clone());
        self.check(id)?;
        self.messages.borrow_mut().retain(|m| m.id != *id);
        Ok(())
    }
}

/// A message created on `2025-03-<day>`.
pub fn message(id: &str, day: u32, is_seen: bool) -> Message {
    Message {
        id: MessageId::from(id),
        name: format!("Visitor {id}"),
        email: format!("{id}@example.org"),
        phone: None,
        purpose: "Freelance Project".to_string(),
        body: format!("Hello from {id}"),
        created_at: format!("2025-03-{day:02}T09:30:00"),
        is_seen,
        ip_address: Some("203.0.113.7".to_string()),
    }
}

/// `count` messages `m1..=m<count>`, all unread, one per day.
pub fn messages(count: u32) -> Vec<Message> {
    (1..=count).map(|d| message(&format!("m{d}"), d, false)).collect()
}

/// Empty state with no favorites.
pub fn empty_state() -> InboxState {
    InboxState::new(Favorites::new(), 12)
}

pub fn ids(messages: &[&Message]) -> Vec<String> {
    messages.iter().map(|m| m.id.to_string()).collect()
}
