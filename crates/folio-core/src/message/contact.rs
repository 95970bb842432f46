//! Public contact-form submissions.

use serde::Serialize;

/// Categories offered on the contact form. The first one is the default.
pub const CONTACT_CATEGORIES: [&str; 5] = [
    "Interview Call",
    "Freelance Project",
    "Internship Opportunity",
    "Collaboration",
    "Other",
];

/// A new message submitted through the public contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMessage {
    /// Sender name.
    pub name: String,
    /// Sender email address.
    pub email: String,
    /// Sender phone number (may be empty).
    pub phone: String,
    /// Purpose of the message.
    pub category: String,
    /// Message body.
    pub message: String,
}

impl Default for NewMessage {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            category: CONTACT_CATEGORIES[0].to_string(),
            message: String::new(),
        }
    }
}

/// Validation error for a contact-form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Name is empty.
    EmptyName,
    /// Email address is empty.
    EmptyEmail,
    /// Email address format is invalid.
    InvalidEmail,
    /// Message body is empty.
    EmptyMessage,
    /// Category is not one the form offers.
    UnknownCategory,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EmptyName => "Name is required",
            Self::EmptyEmail => "Email address is required",
            Self::InvalidEmail => "Invalid email address format",
            Self::EmptyMessage => "Message is required",
            Self::UnknownCategory => "Unknown category",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyName => "name",
            Self::EmptyEmail | Self::InvalidEmail => "email",
            Self::EmptyMessage => "message",
            Self::UnknownCategory => "category",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating a submission.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Validate a contact-form submission.
///
/// # Errors
///
/// Returns every `ValidationError` found.
pub fn validate_new_message(msg: &NewMessage) -> ValidationResult {
    let mut errors = Vec::new();

    if msg.name.trim().is_empty() {
        errors.push(ValidationError::EmptyName);
    }

    if msg.email.trim().is_empty() {
        errors.push(ValidationError::EmptyEmail);
    } else if !msg.email.contains('@') {
        errors.push(ValidationError::InvalidEmail);
    }

    if msg.message.trim().is_empty() {
        errors.push(ValidationError::EmptyMessage);
    }

    if !CONTACT_CATEGORIES.contains(&msg.category.as_str()) {
        errors.push(ValidationError::UnknownCategory);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
