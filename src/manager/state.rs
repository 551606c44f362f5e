//! Connection lifecycle state.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// ConnectionState
// ============================================================================

/// Coarse lifecycle phase of a managed connection.
///
/// ```text
///            connect()                 open
/// Disconnected ──────► Connecting ─────────► Connected
///      ▲                   │ error               │ close ──► Disconnected
///      │ disconnect()      ▼                     │ error ──► Error
///      └────────────── Error ◄───────────────────┘
/// ```
///
/// Only [`connect`](crate::ConnectionManager::connect) leaves `Disconnected`
/// or `Error`; the manager never retries on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// Handshake in progress.
    Connecting,
    /// Open and able to carry frames.
    Connected,
    /// No connection. Initial state.
    #[default]
    Disconnected,
    /// The last connection failed.
    Error,
}

impl ConnectionState {
    /// Returns the lowercase name.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Error => "error",
        }
    }

    /// Returns `true` while a transport handle is live.
    #[inline]
    #[must_use]
    pub const fn has_transport(&self) -> bool {
        matches!(self, Self::Connecting | Self::Connected)
    }

    /// Returns `true` unless a connection attempt is still pending.
    #[inline]
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        !matches!(self, Self::Connecting)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================
