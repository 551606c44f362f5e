//! Builder pattern for manager configuration.
//!
//! # Example
//!
//! ```no_run
//! use ws_link::ConnectionManager;
//!
//! # fn example() -> ws_link::Result<()> {
//! let manager = ConnectionManager::builder()
//!     .on_open(|| println!("open"))
//!     .on_message(|message| println!("{message}"))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::protocol::Message;
use crate::transport::{TransportFactory, WsOptions, WsTransportFactory};

use super::core::ConnectionManager;
use super::diagnostics::{DiagnosticSink, TracingSink};
use super::hooks::Hooks;

// ============================================================================
// ManagerBuilder
// ============================================================================

/// Builder for configuring a [`ConnectionManager`].
///
/// Use [`ConnectionManager::builder()`] to create a new builder.
#[derive(Default)]
pub struct ManagerBuilder {
    /// Initial hook set.
    hooks: Hooks,
    /// Custom transport factory.
    transport: Option<Arc<dyn TransportFactory>>,
    /// Options for the default WebSocket transport.
    ws_options: Option<WsOptions>,
    /// Diagnostic sink.
    diagnostics: Option<Arc<dyn DiagnosticSink>>,
}

// ============================================================================
// ManagerBuilder Implementation
// ============================================================================

impl ManagerBuilder {
    /// Creates a builder with no hooks and the WebSocket transport.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole hook set.
    #[inline]
    #[must_use]
    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Sets the open hook.
    #[inline]
    #[must_use]
    pub fn on_open(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.hooks = self.hooks.on_open(hook);
        self
    }

    /// Sets the message hook.
    #[inline]
    #[must_use]
    pub fn on_message(mut self, hook: impl Fn(Message) + Send + Sync + 'static) -> Self {
        self.hooks = self.hooks.on_message(hook);
        self
    }

    /// Sets the close hook.
    #[inline]
    #[must_use]
    pub fn on_close(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.hooks = self.hooks.on_close(hook);
        self
    }

    /// Sets the error hook.
    #[inline]
    #[must_use]
    pub fn on_error(mut self, hook: impl Fn(&Error) + Send + Sync + 'static) -> Self {
        self.hooks = self.hooks.on_error(hook);
        self
    }

    /// Uses a custom transport factory instead of the WebSocket transport.
    #[inline]
    #[must_use]
    pub fn transport(mut self, factory: impl TransportFactory + 'static) -> Self {
        self.transport = Some(Arc::new(factory));
        self
    }

    /// Tunes the default WebSocket transport.
    #[inline]
    #[must_use]
    pub fn ws_options(mut self, options: WsOptions) -> Self {
        self.ws_options = Some(options);
        self
    }

    /// Routes diagnostic records to `sink` instead of `tracing`.
    #[inline]
    #[must_use]
    pub fn diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.diagnostics = Some(Arc::new(sink));
        self
    }

    /// Builds the manager. No connection is opened.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if both a custom transport and WebSocket options are set
    pub fn build(self) -> Result<ConnectionManager> {
        let factory = self.validate_transport()?;
        let diagnostics = self
            .diagnostics
            .unwrap_or_else(|| Arc::new(TracingSink));

        Ok(ConnectionManager::new_with(factory, diagnostics, self.hooks))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ManagerBuilder {
    /// Resolves the transport factory.
    fn validate_transport(&self) -> Result<Arc<dyn TransportFactory>> {
        match (&self.transport, &self.ws_options) {
            (Some(_), Some(_)) => Err(Error::config(
                "WebSocket options only apply to the default transport. \
                 Configure the custom transport directly instead.",
            )),
            (Some(factory), None) => Ok(Arc::clone(factory)),
            (None, options) => Ok(Arc::new(WsTransportFactory::new(
                options.clone().unwrap_or_default(),
            ))),
        }
    }
}

impl fmt::Debug for ManagerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerBuilder")
            .field("hooks", &self.hooks)
            .field("custom_transport", &self.transport.is_some())
            .field("ws_options", &self.ws_options)
            .field("custom_diagnostics", &self.diagnostics.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::manager::ConnectionState;
    use crate::transport::mock::MockFactory;

    #[test]
    fn test_default_build() {
        let manager = ManagerBuilder::new().build().expect("build");
        assert_eq!(manager.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_ws_options_with_default_transport() {
        let result = ManagerBuilder::new()
            .ws_options(WsOptions::new().with_nodelay())
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_ws_options_with_custom_transport_rejected() {
        let result = ManagerBuilder::new()
            .transport(MockFactory::new())
            .ws_options(WsOptions::new())
            .build();

        let err = result.unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_debug_output() {
        let builder = ManagerBuilder::new().on_open(|| {}).transport(MockFactory::new());
        let text = format!("{builder:?}");
        assert!(text.contains("custom_transport: true"));
        assert!(text.contains("on_open: true"));
    }
}
