use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::{InboundMessage, Mailbox, MessageId};
use crate::{Error, Result};

#[derive(Debug, Default)]
struct State {
    messages: Vec<InboundMessage>,
    processed: BTreeSet<MessageId>,
}

/// In-process mailbox.
///
/// Messages are listed in insertion order until marked processed.
#[derive(Debug, Default)]
pub struct MemoryMailbox {
    state: Mutex<State>,
}

impl MemoryMailbox {
    /// Create an empty mailbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mailbox holding `messages`.
    #[must_use]
    pub fn with_messages(messages: impl IntoIterator<Item = InboundMessage>) -> Self {
        let mailbox = Self::new();
        for message in messages {
            mailbox.push(message);
        }
        mailbox
    }

    /// Add a message.
    pub fn push(&self, message: InboundMessage) {
        self.lock().messages.push(message);
    }

    /// IDs marked processed so far.
    #[must_use]
    pub fn processed_ids(&self) -> Vec<MessageId> {
        self.lock().processed.iter().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Mailbox for MemoryMailbox {
    async fn list_unprocessed(&self) -> Result<Vec<InboundMessage>> {
        let state = self.lock();
        Ok(state
            .messages
            .iter()
            .filter(|m| !state.processed.contains(&m.id))
            .cloned()
            .collect())
    }

    async fn mark_processed(&self, id: &MessageId) -> Result<()> {
        let mut state = self.lock();
        if !state.messages.iter().any(|m| &m.id == id) {
            return Err(Error::InvalidMessageId(id.to_string()));
        }
        state.processed.insert(id.clone());
        Ok(())
    }
}
