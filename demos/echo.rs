//! Echo client demo.
//!
//! Connects to a WebSocket echo server, sends a few messages and prints
//! whatever comes back.
//!
//! Usage:
//!   cargo run --example echo -- [ws://host:port/path] [--debug] [--no-wait]

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tracing_subscriber::EnvFilter;
use ws_link::{ConnectionManager, ConnectionState, Message, Result};

// ============================================================================
// Constants
// ============================================================================

const DEFAULT_ADDRESS: &str = "ws://127.0.0.1:9001";

// ============================================================================
// Types
// ============================================================================

/// Command-line arguments.
#[derive(Debug, Clone)]
struct Args {
    address: String,
    debug: bool,
    no_wait: bool,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self {
            address: args
                .iter()
                .find(|a| !a.starts_with("--"))
                .cloned()
                .unwrap_or_else(|| DEFAULT_ADDRESS.to_string()),
            debug: args.iter().any(|a| a == "--debug"),
            no_wait: args.iter().any(|a| a == "--no-wait"),
        }
    }
}

// ============================================================================
// Functions
// ============================================================================

fn init_logging(debug: bool) {
    let filter = if debug { "ws_link=trace" } else { "ws_link=info" };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let manager = ConnectionManager::builder()
        .on_open(|| println!("[open]"))
        .on_message(|message| println!("[message] {message}"))
        .on_close(|| println!("[close]"))
        .on_error(|err| println!("[error] {err}"))
        .build()?;

    println!("Connecting to {}", args.address);
    manager.connect(&args.address);

    let mut state = manager.watch_state();
    state.wait_for(|s| s.is_settled()).await.ok();

    if manager.state() != ConnectionState::Connected {
        println!("Not connected: {}", manager.state());
        return Ok(());
    }

    for seq in 1..=3 {
        let message = Message::new("ping").with("seq", seq);
        println!("[send] ping {seq} -> {}", manager.send(&message)?);
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    if args.no_wait {
        println!("[--no-wait] Skipping wait");
    } else {
        println!("Press Ctrl+C to exit...");
        tokio::signal::ctrl_c().await.ok();
    }

    manager.disconnect();
    Ok(())
}
