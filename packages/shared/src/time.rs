//! Time-related utilities with clock abstraction for testability.
//!
//! The wire format carries RFC 3339 strings in UTC, so the clock produces
//! those directly instead of raw epoch values.

use chrono::{DateTime, SecondsFormat, Utc};

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get the current time as an RFC 3339 string in UTC (millisecond precision)
    fn now_rfc3339(&self) -> String;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_rfc3339(&self) -> String {
        now_rfc3339()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone)]
pub struct FixedClock {
    fixed_time: String,
}

impl FixedClock {
    /// Create a new fixed clock with the given RFC 3339 timestamp
    pub fn new(fixed_time: impl Into<String>) -> Self {
        Self {
            fixed_time: fixed_time.into(),
        }
    }
}

impl Clock for FixedClock {
    fn now_rfc3339(&self) -> String {
        self.fixed_time.clone()
    }
}

/// Get the current time as an RFC 3339 string in UTC (millisecond precision)
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Render an RFC 3339 timestamp as a short `HH:MM:SS` clock time in UTC.
///
/// Returns the input unchanged when it does not parse, so display code never
/// fails on a malformed or absent-precision timestamp.
pub fn to_clock_time(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(dt) => dt.with_timezone(&Utc).format("%H:%M:%S").to_string(),
        Err(_) => timestamp.to_string(),
    }
}
