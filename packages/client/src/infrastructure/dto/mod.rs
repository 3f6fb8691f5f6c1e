//! Data Transfer Objects (DTOs) for the chat client.
//!
//! DTOs are organized by protocol:
//! - `wire`: WebSocket frame DTOs (publish/subscribe session)
//! - `http`: REST API response DTOs
//! - `message`: the message body shared by both protocols

pub mod conversion;
pub mod http;
pub mod message;
pub mod wire;
