//! Message body DTO shared by the WebSocket frames and the history API.

use serde::{Deserialize, Serialize};

/// Message variant discriminator on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireMessageType {
    #[serde(rename = "TEXT")]
    Text,
    #[serde(rename = "FILE")]
    File,
}

/// JSON-encoded message body.
///
/// The file fields are present only when `message_type` is `FILE`; the
/// timestamp may be absent on legacy history rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageBody {
    pub sender: String,
    pub receiver: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub message_type: WireMessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,
}
