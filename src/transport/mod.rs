//! Transport layer.
//!
//! A transport carries text frames for exactly one connection attempt. The
//! connection manager creates one per `connect` call through a
//! [`TransportFactory`] and learns about its progress through
//! [`TransportEvents`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐   create(address, events)   ┌──────────────────┐
//! │  ConnectionManager   │ ───────────────────────────►│  WsTransport     │
//! │                      │                             │  (tokio task)    │
//! │  HandleId #n         │◄─────────────────────────── │                  │
//! └──────────────────────┘  open / message / error /   └──────────────────┘
//!                           close, tagged with #n
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | tokio-tungstenite transport and event loop |
//! | `events` | Listener handed to each transport |
//! | `handle` | `Transport` and `TransportFactory` traits |
//! | `options` | WebSocket tuning |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket transport and event loop.
pub mod connection;

/// Transport-to-manager event delivery.
pub mod events;

/// Transport seams.
pub mod handle;

/// WebSocket transport options.
pub mod options;

/// Scripted transport for tests.
#[cfg(test)]
pub(crate) mod mock;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{WsTransport, WsTransportFactory};
pub use events::{CloseInfo, TransportEvent, TransportEvents};
pub use handle::{Transport, TransportFactory};
pub use options::WsOptions;
