//! Interactive conversation session.
//!
//! Drives one open conversation: opens it (room + history + live channel),
//! prints the hydrated timeline, then multiplexes rustyline input, inbound
//! messages and connection-state changes in a single event loop. All
//! timeline mutation happens here, sequentially, so the conversation needs
//! no locking.

use std::sync::Arc;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;

use crate::domain::{ChannelError, ChatMessage, FileCatalog, FileEntry, Identity};
use crate::usecase::Conversation;

use super::{formatter::MessageFormatter, prompt::redisplay_prompt};

/// Run the interactive session for one conversation partner.
///
/// Returns an error only when the conversation cannot open at all (room
/// unavailable); every later failure degrades to an on-screen indicator.
pub async fn run_conversation_session(
    mut conversation: Conversation,
    catalog: Arc<dyn FileCatalog>,
    partner: Identity,
) -> Result<(), Box<dyn std::error::Error>> {
    let generation = conversation.open(partner.clone()).await?;

    let self_id = conversation.self_id().clone();
    println!(
        "\nChatting with '{}'. Type messages and press Enter to send.",
        partner
    );
    println!("Commands: /files, /file <id>, /quit");
    print!(
        "{}",
        MessageFormatter::format_connection_state(&conversation.connection_state())
    );
    print!(
        "{}",
        MessageFormatter::format_timeline(conversation.timeline().messages(), &self_id)
    );

    // Snapshot the catalog once; the composer resolves file metadata from it
    let files = match catalog.my_files(&self_id).await {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!("File catalog unavailable: {}", e);
            Vec::new()
        }
    };

    let mut inbound_rx = conversation.take_inbound();
    let mut state_rx = conversation.watch_connection();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();
    let prompt_id = self_id.to_string();
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        let prompt = format!("{}> ", prompt_id);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    loop {
        tokio::select! {
            inbound = recv_inbound(&mut inbound_rx) => match inbound {
                Some(message) => {
                    if conversation.apply_live(generation, message.clone()) {
                        print!("\n{}\n", MessageFormatter::format_message(&message, &self_id));
                        redisplay_prompt(self_id.as_str());
                    }
                }
                None => {
                    // Reader task ended; the state watch carries the reason
                    inbound_rx = None;
                }
            },
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = state_rx.borrow_and_update().clone();
                print!("{}", MessageFormatter::format_connection_state(&state));
                redisplay_prompt(self_id.as_str());
            }
            line = input_rx.recv() => match line {
                Some(line) => {
                    if line == "/quit" || line == "/exit" {
                        break;
                    }
                    handle_input_line(&conversation, &line, &files, &self_id);
                }
                None => break,
            },
        }
    }

    conversation.close().await;
    Ok(())
}

/// Receive from the inbound channel, or park forever once it is gone.
async fn recv_inbound(
    inbound_rx: &mut Option<mpsc::UnboundedReceiver<ChatMessage>>,
) -> Option<ChatMessage> {
    match inbound_rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Dispatch one input line: a command or a text message.
fn handle_input_line(
    conversation: &Conversation,
    line: &str,
    files: &[FileEntry],
    self_id: &Identity,
) {
    let (typed_text, selected_file) = if line == "/files" {
        print!("{}", MessageFormatter::format_file_list(files));
        redisplay_prompt(self_id.as_str());
        return;
    } else if let Some(rest) = line.strip_prefix("/file ") {
        // A selected file wins over any trailing typed text
        let mut parts = rest.trim().splitn(2, ' ');
        let file_id = parts.next().unwrap_or_default().to_string();
        let trailing = parts.next().unwrap_or_default().to_string();
        (trailing, Some(file_id))
    } else if line.starts_with('/') {
        println!("Unknown command. Available: /files, /file <id>, /quit");
        redisplay_prompt(self_id.as_str());
        return;
    } else {
        (line.to_string(), None)
    };

    match conversation.send_action(&typed_text, selected_file.as_deref(), files) {
        Ok(true) => {
            // No local insert: the message joins the timeline on echo
        }
        Ok(false) => {
            tracing::debug!("Nothing composed from input");
        }
        Err(ChannelError::NotConnected) => {
            print!("{}", MessageFormatter::format_send_rejected());
            redisplay_prompt(self_id.as_str());
        }
        Err(e) => {
            tracing::warn!("Send failed: {}", e);
            print!("{}", MessageFormatter::format_send_rejected());
            redisplay_prompt(self_id.as_str());
        }
    }
}
