//! Transport seams.
//!
//! The connection manager owns one [`Transport`] at a time and creates it
//! through a [`TransportFactory`]. The default factory is
//! [`WsTransportFactory`](super::WsTransportFactory); tests and embedders can
//! plug in their own.

// ============================================================================
// Imports
// ============================================================================

use crate::error::Result;

use super::events::TransportEvents;

// ============================================================================
// Transport
// ============================================================================

/// One live connection attempt or established session.
///
/// Implementations report their lifecycle through the [`TransportEvents`]
/// they were created with. None of these methods may block.
pub trait Transport: Send {
    /// Returns `true` when a frame written now would be sent.
    fn is_ready(&self) -> bool;

    /// Writes one text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`](crate::Error::ConnectionClosed) if
    /// the transport can no longer carry frames.
    fn send_text(&self, frame: String) -> Result<()>;

    /// Starts closing the connection. Must be safe to call more than once.
    fn close(&mut self);
}

// ============================================================================
// TransportFactory
// ============================================================================

/// Creates transports bound to an address.
pub trait TransportFactory: Send + Sync {
    /// Creates a transport for `address`.
    ///
    /// Connection progress is reported asynchronously through `events`.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be created at all, for
    /// example because the address is malformed.
    fn create(&self, address: &str, events: TransportEvents) -> Result<Box<dyn Transport>>;
}

impl<F> TransportFactory for F
where
    F: Fn(&str, TransportEvents) -> Result<Box<dyn Transport>> + Send + Sync,
{
    fn create(&self, address: &str, events: TransportEvents) -> Result<Box<dyn Transport>> {
        self(address, events)
    }
}
