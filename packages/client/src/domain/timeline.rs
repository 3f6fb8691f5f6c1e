//! The in-memory ordered view of a conversation.
//!
//! Fed by hydration (one bulk `replace_all`) and by the live channel
//! (incremental `append`). Rendering order is insertion order; messages are
//! never re-sorted by timestamp, so concurrent sends render in the order the
//! server fanned them out.

use std::collections::HashSet;

use super::message::{ChatMessage, DedupKey};

/// Ordered, de-duplicated sequence of messages for one conversation.
#[derive(Debug, Default)]
pub struct Timeline {
    messages: Vec<ChatMessage>,
    seen: HashSet<DedupKey>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole timeline with a hydrated history batch.
    ///
    /// Duplicates inside the batch itself are dropped; order of the
    /// survivors is preserved. Called at most once per activation, strictly
    /// before any live append is applied.
    pub fn replace_all(&mut self, batch: Vec<ChatMessage>) {
        self.messages.clear();
        self.seen.clear();
        for message in batch {
            self.push_unique(message);
        }
    }

    /// Append a live message.
    ///
    /// Returns `false` when the message was a duplicate of one already in
    /// the timeline and was dropped.
    pub fn append(&mut self, message: ChatMessage) -> bool {
        self.push_unique(message)
    }

    fn push_unique(&mut self, message: ChatMessage) -> bool {
        if !self.seen.insert(message.dedup_key()) {
            return false;
        }
        self.messages.push(message);
        true
    }

    /// Snapshot for rendering, in insertion order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
