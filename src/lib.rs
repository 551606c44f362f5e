//! ws-link - Client-side persistent WebSocket connection manager.
//!
//! This library manages one bidirectional message-stream connection to a
//! backend and exposes a small lifecycle state machine plus a JSON message
//! API to the rest of an application.
//!
//! # Architecture
//!
//! - **Manager**: owns at most one transport handle, tracks
//!   [`ConnectionState`], forwards events to caller [`Hooks`]
//! - **Transport**: carries text frames for one connection attempt; the
//!   default is a tokio-tungstenite WebSocket driven by its own task
//! - **Protocol**: one JSON value per frame; outbound messages carry a `type` field
//!
//! Key design principles:
//!
//! - Events are tagged with the [`HandleId`] they came from; replacing a
//!   handle detaches its listener before closing it
//! - Hooks are read at dispatch time, so updating them never reconnects
//! - No retries, no queuing, no timeouts: callers own that policy
//!
//! # Quick Start
//!
//! ```no_run
//! use ws_link::{ConnectionManager, Message, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let manager = ConnectionManager::builder()
//!         .on_open(|| println!("open"))
//!         .on_message(|message| println!("received {message}"))
//!         .on_close(|| println!("closed"))
//!         .on_error(|err| eprintln!("failed: {err}"))
//!         .build()?;
//!
//!     manager.connect("ws://127.0.0.1:9000/socket");
//!
//!     let mut state = manager.watch_state();
//!     state.wait_for(|s| s.is_settled()).await.ok();
//!
//!     manager.send(&Message::new("ping"))?;
//!     manager.disconnect();
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`manager`] | [`ConnectionManager`], hooks, diagnostics |
//! | [`protocol`] | [`Message`] and frame codec |
//! | [`transport`] | Transport seams and the WebSocket transport |

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Connection manager, hooks and diagnostics.
///
/// Use [`ConnectionManager::builder()`] to create a configured manager.
pub mod manager;

/// Wire protocol message types.
pub mod protocol;

/// Transport layer.
///
/// Implement [`Transport`] and [`TransportFactory`] to plug in something
/// other than the default WebSocket transport.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::HandleId;

// Manager types
pub use manager::{
    ConnectionManager, ConnectionState, Diagnostic, DiagnosticKind, DiagnosticSink, Hooks,
    ManagerBuilder, TracingSink,
};

// Protocol types
pub use protocol::{Message, decode_frame, encode_frame};

// Transport types
pub use transport::{
    CloseInfo, Transport, TransportEvent, TransportEvents, TransportFactory, WsOptions,
    WsTransport, WsTransportFactory,
};
