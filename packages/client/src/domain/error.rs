//! Error types for the chat client core.
//!
//! Each component converts its network-layer failures into one of these
//! kinds at its own boundary; nothing propagates as an unhandled fault to
//! the rendering layer.

use thiserror::Error;

/// Identity validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// Empty or whitespace-only identity
    #[error("identity must not be empty")]
    Empty,

    /// Value does not look like an email address
    #[error("identity '{0}' is not an email address")]
    NotAnEmail(String),

    /// Both sides of a conversation resolved to the same identity
    #[error("conversation requires two distinct identities")]
    SamePair,
}

/// Room service failures. Fatal to opening a conversation.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Non-2xx response from the room service
    #[error("room service returned status {0}")]
    Status(u16),

    /// Transport-level failure reaching the room service
    #[error("room service unreachable: {0}")]
    Network(String),

    /// Response body did not match the expected shape
    #[error("room payload malformed: {0}")]
    Malformed(String),
}

/// History service failures. Non-fatal: the conversation opens with an
/// empty timeline.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Non-2xx response from the history service
    #[error("history service returned status {0}")]
    Status(u16),

    /// Transport-level failure reaching the history service
    #[error("history service unreachable: {0}")]
    Network(String),

    /// Response body did not match the expected shape
    #[error("history payload malformed: {0}")]
    Malformed(String),
}

/// File listing failures. Non-fatal: the catalog degrades to an empty list.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Non-2xx response from the file service
    #[error("file service returned status {0}")]
    Status(u16),

    /// Transport-level failure reaching the file service
    #[error("file service unreachable: {0}")]
    Network(String),

    /// Response body did not match the expected shape
    #[error("file payload malformed: {0}")]
    Malformed(String),
}

/// Live channel failures
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Send attempted while the channel is not in `Connected`
    #[error("channel is not connected")]
    NotConnected,

    /// WebSocket handshake failed
    #[error("websocket handshake failed: {0}")]
    Handshake(String),

    /// Transport-level failure on an established channel
    #[error("transport error: {0}")]
    Transport(String),

    /// The server violated the frame protocol (bad ack, error frame)
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Conversation-level failures surfaced to the caller.
///
/// Channel failures are deliberately absent: a failed connection leaves the
/// conversation open in the `Errored` state with a visible indicator, it
/// does not abort the activation.
#[derive(Debug, Error)]
pub enum ConversationError {
    /// The room resolver failed; the conversation cannot open
    #[error("room unavailable: {0}")]
    RoomUnavailable(#[source] DirectoryError),

    /// One of the identities failed validation
    #[error(transparent)]
    InvalidIdentity(#[from] IdentityError),
}
