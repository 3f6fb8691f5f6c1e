//! Chat client core for the Kaiwa chat application.
//!
//! This library implements the conversation lifecycle for a two-party chat:
//! resolving a durable room for a pair of identities, hydrating it with
//! history, holding a live WebSocket subscription and merging both feeds
//! into one ordered, de-duplicated timeline.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
