//! Error types for the core library.

use thiserror::Error;

use crate::lead::LeadId;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raw message could not be parsed.
    #[error("MIME error: {0}")]
    Mime(#[from] leadledger_mime::Error),

    /// The mailbox could not be reached or listed.
    #[error("Mailbox unavailable: {0}")]
    MailboxUnavailable(String),

    /// A message ID the mailbox does not know or cannot accept.
    #[error("Invalid message ID: {0}")]
    InvalidMessageId(String),

    /// Lead not found.
    #[error("Lead not found: {0}")]
    LeadNotFound(LeadId),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
