//! WebSocket transport and its event loop.
//!
//! Each [`WsTransport`] owns one tokio task that drives a single
//! tokio-tungstenite stream.
//!
//! # Event Loop
//!
//! The task handles:
//!
//! - The opening handshake, aborted if the handle is closed or dropped first
//! - Incoming text frames, forwarded one by one
//! - Outgoing frames queued by [`Transport::send_text`]
//! - Close frames, stream errors and stream end
//!
//! No timeout is applied to the handshake; a peer that never answers leaves
//! the attempt pending until the handle is closed.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::{SinkExt, StreamExt};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async_with_config;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{Error, Result};

use super::events::{CloseInfo, TransportEvents};
use super::handle::{Transport, TransportFactory};
use super::options::WsOptions;

// ============================================================================
// Constants
// ============================================================================

/// URL schemes the transport accepts.
const SUPPORTED_SCHEMES: &[&str] = &["ws", "wss"];

// ============================================================================
// TransportCommand
// ============================================================================

/// Internal commands for the event loop.
enum TransportCommand {
    /// Write one text frame.
    Send(String),
    /// Send a close frame and stop.
    Close,
}

// ============================================================================
// WsTransportFactory
// ============================================================================

/// Creates [`WsTransport`]s on the current tokio runtime.
#[derive(Debug, Clone, Default)]
pub struct WsTransportFactory {
    options: WsOptions,
}

impl WsTransportFactory {
    /// Creates a factory with the given options.
    #[inline]
    #[must_use]
    pub fn new(options: WsOptions) -> Self {
        Self { options }
    }

    /// Returns the options used for new transports.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &WsOptions {
        &self.options
    }

    /// Validates an address the way the transport will use it.
    fn parse_address(address: &str) -> Result<Url> {
        let url = Url::parse(address).map_err(|e| Error::invalid_address(address, e.to_string()))?;

        if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
            return Err(Error::invalid_address(
                address,
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        Ok(url)
    }
}

impl TransportFactory for WsTransportFactory {
    /// Spawns the connection task.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidAddress`] if the address is not a `ws://` or `wss://` URL
    /// - [`Error::Config`] if called outside a tokio runtime
    fn create(&self, address: &str, events: TransportEvents) -> Result<Box<dyn Transport>> {
        let url = Self::parse_address(address)?;
        let runtime = Handle::try_current()
            .map_err(|e| Error::config(format!("WebSocket transport needs a tokio runtime: {e}")))?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let ready = Arc::new(AtomicBool::new(false));

        runtime.spawn(WsTransport::run_event_loop(
            url,
            self.options.clone(),
            events,
            command_rx,
            Arc::clone(&ready),
        ));

        Ok(Box::new(WsTransport { command_tx, ready }))
    }
}

// ============================================================================
// WsTransport
// ============================================================================

/// One WebSocket connection driven by a background task.
///
/// Dropping the handle ends the task without reporting further events.
pub struct WsTransport {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<TransportCommand>,
    /// Set once the handshake completes, cleared on close or failure.
    ready: Arc<AtomicBool>,
}

impl Transport for WsTransport {
    #[inline]
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn send_text(&self, frame: String) -> Result<()> {
        if !self.is_ready() {
            return Err(Error::ConnectionClosed);
        }

        self.command_tx
            .send(TransportCommand::Send(frame))
            .map_err(|_| Error::ConnectionClosed)
    }

    fn close(&mut self) {
        self.ready.store(false, Ordering::Release);
        let _ = self.command_tx.send(TransportCommand::Close);
    }
}

impl WsTransport {
    /// Event loop that handles WebSocket I/O for one handle.
    async fn run_event_loop(
        url: Url,
        options: WsOptions,
        events: TransportEvents,
        mut command_rx: mpsc::UnboundedReceiver<TransportCommand>,
        ready: Arc<AtomicBool>,
    ) {
        let handle = events.handle();
        let address = url.to_string();

        let connect = connect_async_with_config(
            address.as_str(),
            Some(options.to_config()),
            options.disable_nagle,
        );
        tokio::pin!(connect);

        // Handshake, unless the handle is closed first
        let ws_stream = loop {
            tokio::select! {
                result = &mut connect => {
                    match result {
                        Ok((stream, _response)) => break stream,
                        Err(e) => {
                            debug!(%handle, error = %e, "WebSocket handshake failed");
                            events.error(Error::WebSocket(e));
                            return;
                        }
                    }
                }

                command = command_rx.recv() => {
                    match command {
                        Some(TransportCommand::Send(_)) => {
                            warn!(%handle, "Frame queued before open, dropped");
                        }
                        Some(TransportCommand::Close) | None => {
                            debug!(%handle, "Connection attempt abandoned");
                            return;
                        }
                    }
                }
            }
        };

        ready.store(true, Ordering::Release);
        debug!(%handle, %address, "WebSocket open");
        events.open();

        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                // Incoming frames from the peer
                message = ws_read.next() => {
                    match message {
                        Some(Ok(WsMessage::Text(text))) => {
                            trace!(%handle, len = text.len(), "Frame received");
                            events.message(text.as_str());
                        }

                        Some(Ok(WsMessage::Close(frame))) => {
                            ready.store(false, Ordering::Release);
                            let info = frame
                                .map(|f| CloseInfo::new(u16::from(f.code), f.reason.as_str()))
                                .unwrap_or_default();
                            debug!(%handle, %info, "WebSocket closed by remote");
                            events.close(info);
                            break;
                        }

                        Some(Err(e)) => {
                            ready.store(false, Ordering::Release);
                            events.error(Error::WebSocket(e));
                            break;
                        }

                        None => {
                            ready.store(false, Ordering::Release);
                            debug!(%handle, "WebSocket stream ended");
                            events.close(CloseInfo::abrupt());
                            break;
                        }

                        Some(Ok(WsMessage::Binary(data))) => {
                            debug!(%handle, len = data.len(), "Ignoring binary frame");
                        }

                        // Ping, Pong, raw Frame
                        Some(Ok(_)) => {}
                    }
                }

                // Commands from the owning handle
                command = command_rx.recv() => {
                    match command {
                        Some(TransportCommand::Send(frame)) => {
                            if let Err(e) = ws_write.send(WsMessage::Text(frame.into())).await {
                                ready.store(false, Ordering::Release);
                                events.error(Error::WebSocket(e));
                                break;
                            }
                            trace!(%handle, "Frame sent");
                        }

                        Some(TransportCommand::Close) => {
                            debug!(%handle, "Close requested");
                            let _ = ws_write.close().await;
                            break;
                        }

                        None => {
                            debug!(%handle, "Transport handle dropped");
                            break;
                        }
                    }
                }
            }
        }

        ready.store(false, Ordering::Release);
        debug!(%handle, "Event loop terminated");
    }
}

// ============================================================================
// Tests
// ============================================================================
