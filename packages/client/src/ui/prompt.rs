//! Prompt utilities for the interactive session.

use std::io::Write;

/// Redisplay the prompt after printing asynchronous output
pub fn redisplay_prompt(client_id: &str) {
    print!("{}> ", client_id);
    std::io::stdout().flush().ok();
}
