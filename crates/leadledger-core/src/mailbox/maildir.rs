use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use super::{InboundMessage, Mailbox, MessageId};
use crate::{Error, Result};

/// Maildir info suffix marking a message seen.
const SEEN_SUFFIX: &str = ":2,S";

/// A maildir spool: unprocessed messages in `new/`, processed ones moved to
/// `cur/`.
#[derive(Debug, Clone)]
pub struct MaildirMailbox {
    root: PathBuf,
}

impl MaildirMailbox {
    /// Open a maildir rooted at `root`. Nothing is touched on disk.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create `new/`, `cur/` and `tmp/` if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created.
    pub async fn ensure_layout(&self) -> Result<()> {
        for dir in ["new", "cur", "tmp"] {
            fs::create_dir_all(self.root.join(dir)).await?;
        }
        Ok(())
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn new_dir(&self) -> PathBuf {
        self.root.join("new")
    }

    fn cur_dir(&self) -> PathBuf {
        self.root.join("cur")
    }

    async fn read_message(&self, path: &Path, id: MessageId) -> Result<InboundMessage> {
        let bytes = fs::read(path).await?;
        let raw = String::from_utf8_lossy(&bytes);

        Ok(InboundMessage::parse_raw(id.clone(), &raw).unwrap_or_else(|e| {
            warn!(message = %id, error = %e, "Message could not be parsed");
            InboundMessage::unparsed(id, &raw)
        }))
    }
}

#[async_trait]
impl Mailbox for MaildirMailbox {
    async fn list_unprocessed(&self) -> Result<Vec<InboundMessage>> {
        let new_dir = self.new_dir();
        let mut entries = fs::read_dir(&new_dir).await.map_err(|e| {
            Error::MailboxUnavailable(format!("{}: {e}", new_dir.display()))
        })?;

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with('.') {
                names.push(name);
            }
        }
        // Maildir names start with the delivery timestamp
        names.sort();

        let mut messages = Vec::with_capacity(names.len());
        for name in names {
            let path = new_dir.join(&name);
            messages.push(self.read_message(&path, MessageId::new(name)).await?);
        }

        debug!(root = %self.root.display(), count = messages.len(), "Listed maildir");
        Ok(messages)
    }

    async fn mark_processed(&self, id: &MessageId) -> Result<()> {
        let name = id.as_str();
        if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
            return Err(Error::InvalidMessageId(name.to_string()));
        }

        fs::create_dir_all(self.cur_dir()).await?;
        let from = self.new_dir().join(name);
        let to = self.cur_dir().join(format!("{name}{SEEN_SUFFIX}"));

        match fs::rename(&from, &to).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(Error::InvalidMessageId(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const RAW: &str = "From: leads@reallymoving.com\r\nSubject: Lead\r\n\r\nEmail: a@b.com\r\n";

    #[tokio::test]
    async fn test_list_and_mark_processed() {
        let dir = tempfile::tempdir().unwrap();
        let mailbox = MaildirMailbox::new(dir.path());
        mailbox.ensure_layout().await.unwrap();

        fs::write(dir.path().join("new/1700000002.b"), RAW).await.unwrap();
        fs::write(dir.path().join("new/1700000001.a"), RAW).await.unwrap();
        fs::write(dir.path().join("new/.hidden"), RAW).await.unwrap();

        let messages = mailbox.list_unprocessed().await.unwrap();
        let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["1700000001.a", "1700000002.b"]);
        assert_eq!(messages[0].from, "leads@reallymoving.com");

        mailbox.mark_processed(&messages[0].id).await.unwrap();
        assert!(dir.path().join("cur/1700000001.a:2,S").exists());
        assert_eq!(mailbox.list_unprocessed().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_new_dir_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mailbox = MaildirMailbox::new(dir.path().join("absent"));
        let result = mailbox.list_unprocessed().await;
        assert!(matches!(result, Err(Error::MailboxUnavailable(_))));
    }

    #[tokio::test]
    async fn test_rejects_path_ids() {
        let dir = tempfile::tempdir().unwrap();
        let mailbox = MaildirMailbox::new(dir.path());
        mailbox.ensure_layout().await.unwrap();

        for id in ["../escape", "", ".hidden", "missing"] {
            let result = mailbox.mark_processed(&MessageId::new(id)).await;
            assert!(matches!(result, Err(Error::InvalidMessageId(_))), "{id}");
        }
    }

    #[tokio::test]
    async fn test_unparseable_message_still_listed() {
        let dir = tempfile::tempdir().unwrap();
        let mailbox = MaildirMailbox::new(dir.path());
        mailbox.ensure_layout().await.unwrap();
        fs::write(dir.path().join("new/broken"), "").await.unwrap();

        let messages = mailbox.list_unprocessed().await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].from, "");
    }
}
