//! Kaiwa chat client.
//!
//! Opens a two-party conversation: resolves the room, loads the history,
//! subscribes to the live channel and exchanges messages from stdin.
//! The identity is cached in a session file and reused until `--logout`.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kaiwa-client -- --email alice@example.com --partner bob@example.com
//! cargo run --bin kaiwa-client -- -p bob@example.com
//! cargo run --bin kaiwa-client -- --logout
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use kaiwa_client::domain::{FileCatalog, Identity};
use kaiwa_client::infrastructure::channel::ChannelConfig;
use kaiwa_client::infrastructure::rest::{HttpFileCatalog, HttpHistoryArchive, HttpRoomDirectory};
use kaiwa_client::infrastructure::session_store::SessionStore;
use kaiwa_client::ui::run_conversation_session;
use kaiwa_client::usecase::{Conversation, MessageComposer};
use kaiwa_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "kaiwa-client")]
#[command(about = "Two-party chat client with live timeline and file sharing", long_about = None)]
struct Args {
    /// Your identity (email). Saved to the session file; omit to resume
    #[arg(short = 'e', long)]
    email: Option<String>,

    /// Conversation partner (email)
    #[arg(short = 'p', long)]
    partner: Option<String>,

    /// REST API base URL
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    api_url: String,

    /// WebSocket endpoint URL
    #[arg(long, default_value = "ws://127.0.0.1:8080/ws")]
    socket_url: String,

    /// Auth token forwarded on the live channel
    #[arg(long)]
    token: Option<String>,

    /// Directory holding the session file
    #[arg(long, default_value = ".kaiwa")]
    state_dir: PathBuf,

    /// Forget the saved session and exit
    #[arg(long)]
    logout: bool,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let store = SessionStore::new(&args.state_dir);

    if args.logout {
        store.clear()?;
        println!("Logged out.");
        return Ok(());
    }

    // Explicit session init: read the cached identity once, here, and hand
    // Identity values down; components never touch the store themselves.
    let self_id = match args.email {
        Some(email) => {
            let identity = Identity::new(email)?;
            store.save(&identity)?;
            identity
        }
        None => store
            .load()?
            .ok_or("not logged in: pass --email to start a session")?,
    };

    let partner = Identity::new(
        args.partner
            .ok_or("no partner selected: pass --partner <email>")?,
    )?;

    let http = reqwest::Client::new();
    let directory = Arc::new(HttpRoomDirectory::new(http.clone(), args.api_url.clone()));
    let archive = Arc::new(HttpHistoryArchive::new(http.clone(), args.api_url.clone()));
    let catalog: Arc<dyn FileCatalog> = Arc::new(HttpFileCatalog::new(http, args.api_url));

    let channel_config = ChannelConfig {
        socket_url: args.socket_url,
        token: args.token,
    };

    let conversation = Conversation::new(
        self_id,
        directory,
        archive,
        channel_config,
        MessageComposer::system(),
    );

    run_conversation_session(conversation, catalog, partner).await
}
