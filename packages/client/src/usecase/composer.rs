//! Outbound message composition.
//!
//! Builds the two outbound payload variants and validates their
//! preconditions. Composition has no side effects: an invalid precondition
//! yields `None` and nothing is handed to the channel.

use std::sync::Arc;

use kaiwa_shared::time::{Clock, SystemClock};

use crate::domain::{ChatMessage, ConnectionState, FileEntry, FileShare, Identity, can_send};

/// Display name used when a selected file id is missing from the catalog.
const UNKNOWN_FILE_NAME: &str = "unknown-file";

/// Builds outbound messages for the active conversation.
pub struct MessageComposer {
    clock: Arc<dyn Clock>,
}

impl MessageComposer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Composer stamping messages with the system clock.
    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    /// Compose a text message.
    ///
    /// Returns `None` when the content is empty or whitespace-only, when no
    /// partner is selected, or when the channel is not connected.
    pub fn compose_text(
        &self,
        sender: &Identity,
        partner: Option<&Identity>,
        state: &ConnectionState,
        content: &str,
    ) -> Option<ChatMessage> {
        let partner = partner?;
        if !can_send(state) {
            return None;
        }
        let content = content.trim();
        if content.is_empty() {
            return None;
        }

        Some(ChatMessage::text(
            sender.clone(),
            partner.clone(),
            content,
            Some(self.clock.now_rfc3339()),
        ))
    }

    /// Compose a file-share message.
    ///
    /// Display metadata is looked up in the provided catalog snapshot; an
    /// unknown id falls back to placeholder values rather than failing.
    /// Returns `None` when no file is selected or when the partner /
    /// connection preconditions fail.
    pub fn compose_file(
        &self,
        sender: &Identity,
        partner: Option<&Identity>,
        state: &ConnectionState,
        file_id: &str,
        catalog: &[FileEntry],
    ) -> Option<ChatMessage> {
        let partner = partner?;
        if !can_send(state) {
            return None;
        }
        let file_id = file_id.trim();
        if file_id.is_empty() {
            return None;
        }

        let file = match catalog.iter().find(|entry| entry.id == file_id) {
            Some(entry) => FileShare {
                file_id: entry.id.clone(),
                file_name: entry.filename.clone(),
                file_owner_id: entry.owner_id.clone(),
                storage_path: entry.storage_path.clone().unwrap_or_default(),
            },
            None => {
                tracing::warn!("File '{}' not in catalog, using placeholders", file_id);
                FileShare {
                    file_id: file_id.to_string(),
                    file_name: UNKNOWN_FILE_NAME.to_string(),
                    file_owner_id: sender.as_str().to_string(),
                    storage_path: String::new(),
                }
            }
        };

        Some(ChatMessage::file_share(
            sender.clone(),
            partner.clone(),
            file,
            Some(self.clock.now_rfc3339()),
        ))
    }

    /// The single user-triggered send action.
    ///
    /// A selected file takes precedence over any typed text; exactly one
    /// message (or none) comes out.
    pub fn compose_outgoing(
        &self,
        sender: &Identity,
        partner: Option<&Identity>,
        state: &ConnectionState,
        typed_text: &str,
        selected_file: Option<&str>,
        catalog: &[FileEntry],
    ) -> Option<ChatMessage> {
        match selected_file {
            Some(file_id) if !file_id.trim().is_empty() => {
                self.compose_file(sender, partner, state, file_id, catalog)
            }
            _ => self.compose_text(sender, partner, state, typed_text),
        }
    }
}
