//! Shared library for the Kaiwa chat client.
//!
//! Cross-cutting utilities used by every binary: clock abstraction and
//! logging setup.

pub mod logger;
pub mod time;
