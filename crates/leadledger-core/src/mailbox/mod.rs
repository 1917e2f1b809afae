//! Sources of inbound enquiry emails.
//!
//! The pipeline only needs two operations from a mailbox: list what has not
//! been processed yet, and mark a message processed. [`MaildirMailbox`]
//! reads a local spool directory; [`MemoryMailbox`] holds messages in
//! process.

mod maildir;
mod memory;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadledger_mime::Message;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::ingest::MessageBody;

pub use maildir::MaildirMailbox;
pub use memory::MemoryMailbox;

/// Mailbox-assigned message identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Create a message ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A message waiting to be ingested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Mailbox identifier.
    pub id: MessageId,
    /// Raw `From` header value.
    pub from: String,
    /// Decoded subject.
    pub subject: String,
    /// Plain-text body.
    pub text: Option<String>,
    /// HTML body.
    pub html: Option<String>,
    /// When the message was sent, if known.
    pub received_at: Option<DateTime<Utc>>,
}

impl InboundMessage {
    /// Create a message with no body.
    #[must_use]
    pub fn new(id: impl Into<String>, from: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(id),
            from: from.into(),
            subject: subject.into(),
            text: None,
            html: None,
            received_at: None,
        }
    }

    /// Set the plain-text body.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the HTML body.
    #[must_use]
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Set the received timestamp.
    #[must_use]
    pub const fn with_received_at(mut self, received_at: DateTime<Utc>) -> Self {
        self.received_at = Some(received_at);
        self
    }

    /// Build from a parsed MIME message.
    #[must_use]
    pub fn from_mime(id: MessageId, message: &Message) -> Self {
        Self {
            id,
            from: message.from().unwrap_or_default(),
            subject: message.subject().unwrap_or_default(),
            text: message.text_body(),
            html: message.html_body(),
            received_at: message.date(),
        }
    }

    /// Parse a raw RFC 5322 message.
    ///
    /// # Errors
    ///
    /// Returns an error if the message has no header block or a multipart
    /// body is malformed.
    pub fn parse_raw(id: MessageId, raw: &str) -> Result<Self> {
        let message = Message::parse(raw)?;
        Ok(Self::from_mime(id, &message))
    }

    /// A message that could not be parsed, kept with its raw content as the
    /// text body so it still reaches the pipeline and gets marked processed.
    #[must_use]
    pub fn unparsed(id: MessageId, raw: &str) -> Self {
        Self {
            id,
            from: String::new(),
            subject: String::new(),
            text: Some(raw.to_string()),
            html: None,
            received_at: None,
        }
    }

    /// Borrow the parts extractors read.
    #[must_use]
    pub fn body(&self) -> MessageBody<'_> {
        MessageBody {
            subject: &self.subject,
            text: self.text.as_deref(),
            html: self.html.as_deref(),
        }
    }
}

/// A store of inbound messages.
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// Messages not yet marked processed, oldest first.
    async fn list_unprocessed(&self) -> Result<Vec<InboundMessage>>;

    /// Mark one message processed so it is not listed again.
    async fn mark_processed(&self, id: &MessageId) -> Result<()>;
}

#[async_trait]
impl<T: Mailbox + ?Sized> Mailbox for std::sync::Arc<T> {
    async fn list_unprocessed(&self) -> Result<Vec<InboundMessage>> {
        (**self).list_unprocessed().await
    }

    async fn mark_processed(&self, id: &MessageId) -> Result<()> {
        (**self).mark_processed(id).await
    }
}
