//! Chat message entities.
//!
//! A message is immutable once created. It arrives from two provenances:
//! historical (loaded in bulk, already ordered) and live (pushed singly over
//! the subscription). Both converge in the [`Timeline`](super::Timeline).

use super::identity::Identity;

/// The two message variants carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    File,
}

/// File reference attached to a `MessageKind::File` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileShare {
    pub file_id: String,
    pub file_name: String,
    pub file_owner_id: String,
    pub storage_path: String,
}

/// A single chat message exchanged between the two participants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: Identity,
    pub receiver: Identity,
    pub content: String,
    /// RFC 3339 timestamp assigned by the composer; absent on legacy rows.
    pub timestamp: Option<String>,
    pub kind: MessageKind,
    /// Present only when `kind` is `MessageKind::File`.
    pub file: Option<FileShare>,
}

impl ChatMessage {
    /// Build a plain text message.
    pub fn text(
        sender: Identity,
        receiver: Identity,
        content: impl Into<String>,
        timestamp: Option<String>,
    ) -> Self {
        Self {
            sender,
            receiver,
            content: content.into(),
            timestamp,
            kind: MessageKind::Text,
            file: None,
        }
    }

    /// Build a file-share message. The content carries the display name so
    /// that renderers without file support still show something meaningful.
    pub fn file_share(
        sender: Identity,
        receiver: Identity,
        file: FileShare,
        timestamp: Option<String>,
    ) -> Self {
        Self {
            sender,
            receiver,
            content: file.file_name.clone(),
            timestamp,
            kind: MessageKind::File,
            file: Some(file),
        }
    }

    /// Key used by the timeline to drop duplicate deliveries.
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            sender: self.sender.as_str().to_string(),
            timestamp: self.timestamp.clone(),
            content: self.content.clone(),
        }
    }
}

/// Identity of a message for de-duplication: the (sender, timestamp, content)
/// triple. An absent timestamp is a distinct value, not a wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    sender: String,
    timestamp: Option<String>,
    content: String,
}

/// A row from the file-listing collaborator, used to resolve display
/// metadata when composing a file-share message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub id: String,
    pub filename: String,
    pub owner_id: String,
    pub storage_path: Option<String>,
    pub size: Option<u64>,
    pub content_type: Option<String>,
}
