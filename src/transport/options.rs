//! WebSocket transport options.
//!
//! # Example
//!
//! ```ignore
//! use ws_link::WsOptions;
//!
//! let options = WsOptions::new()
//!     .with_max_message_size(4 << 20)
//!     .with_nodelay();
//! ```

// ============================================================================
// Imports
// ============================================================================

use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;

// ============================================================================
// WsOptions
// ============================================================================

/// Tuning for the tokio-tungstenite transport.
///
/// `None` limits keep tungstenite's own defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WsOptions {
    /// Largest inbound message accepted, in bytes.
    pub max_message_size: Option<usize>,

    /// Largest single inbound frame accepted, in bytes.
    pub max_frame_size: Option<usize>,

    /// Set `TCP_NODELAY` on the socket.
    pub disable_nagle: bool,
}

// ============================================================================
// Constructors
// ============================================================================

impl WsOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_message_size: None,
            max_frame_size: None,
            disable_nagle: false,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl WsOptions {
    /// Limits inbound message size.
    #[inline]
    #[must_use]
    pub const fn with_max_message_size(mut self, bytes: usize) -> Self {
        self.max_message_size = Some(bytes);
        self
    }

    /// Limits inbound frame size.
    #[inline]
    #[must_use]
    pub const fn with_max_frame_size(mut self, bytes: usize) -> Self {
        self.max_frame_size = Some(bytes);
        self
    }

    /// Disables Nagle's algorithm.
    #[inline]
    #[must_use]
    pub const fn with_nodelay(mut self) -> Self {
        self.disable_nagle = true;
        self
    }
}

// ============================================================================
// Conversion
// ============================================================================

impl WsOptions {
    /// Builds the tungstenite protocol config.
    #[must_use]
    pub(crate) fn to_config(&self) -> WebSocketConfig {
        let mut config = WebSocketConfig::default();
        if self.max_message_size.is_some() {
            config = config.max_message_size(self.max_message_size);
        }
        if self.max_frame_size.is_some() {
            config = config.max_frame_size(self.max_frame_size);
        }
        config
    }
}

// ============================================================================
// Tests
// ============================================================================
