//! Contact message models.

mod contact;
mod model;

pub use contact::{
    CONTACT_CATEGORIES, NewMessage, ValidationError, ValidationResult, validate_new_message,
};
pub use model::{Message, MessageId, format_timestamp};
