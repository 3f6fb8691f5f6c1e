//! WebSocket frame DTOs for the publish/subscribe session.
//!
//! After the handshake the client registers its interest in the room topic
//! with a `subscribe` frame and publishes outbound messages to the send
//! destination; the server acknowledges the subscription and then fans out
//! `message` frames to every subscriber of the topic, the sender included.

use serde::{Deserialize, Serialize};

use crate::domain::RoomId;

use super::message::MessageBody;

/// Destination every outbound chat message is published to.
pub const SEND_DESTINATION: &str = "/app/chat.sendMessage";

/// Topic the client subscribes to for a room.
pub fn topic_destination(room_id: &RoomId) -> String {
    format!("/topic/{}", room_id.as_str())
}

/// Frames sent by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientFrame {
    /// Register the subscription for a room topic
    Subscribe { destination: String },
    /// Publish a message to the send destination
    Send {
        destination: String,
        message: MessageBody,
    },
}

/// Frames pushed by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerFrame {
    /// Subscription acknowledged; inbound delivery starts after this
    Subscribed { destination: String },
    /// A message fanned out to the room topic
    Message {
        destination: String,
        message: MessageBody,
    },
    /// Protocol-level failure reported by the server
    Error { reason: String },
}
