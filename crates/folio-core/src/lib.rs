//! # folio-core
//!
//! Core logic for the Folio portfolio admin tools.
//!
//! This crate provides:
//! - The message inbox view state (filter, search, windowing, preview,
//!   selection, optimistic mutations, bulk delete)
//! - Locally persisted favorites in a SQLite key-value table
//! - A REST gateway to the portfolio backend
//! - Admin sessions stored in the system keyring
//! - Settings

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
mod error;
pub mod favorites;
pub mod gateway;
pub mod inbox;
pub mod message;
pub mod session;
pub mod storage;

pub use config::{AppContext, Settings};
pub use error::{Error, Result};
pub use favorites::{FAVORITES_KEY, Favorites};
pub use gateway::{HttpGateway, LoginRequest, MessageGateway};
pub use inbox::{Action, Effect, Filter, InboxController, InboxState, Notice, NoticeLevel};
pub use message::{Message, MessageId, NewMessage, validate_new_message};
pub use session::{CredentialError, Session, credentials};
pub use storage::{DATABASE_FILE, KeyValueStore, MemoryStore, SqliteStore};
