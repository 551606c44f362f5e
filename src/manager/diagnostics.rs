//! Diagnostic records for every transition and failure.
//!
//! The manager never logs directly. It builds a [`Diagnostic`] and hands it
//! to the configured [`DiagnosticSink`]. The default [`TracingSink`] turns
//! records into `tracing` events under the `ws_link::manager` target.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, trace, warn};

use crate::identifiers::HandleId;

use super::state::ConnectionState;

// ============================================================================
// DiagnosticKind
// ============================================================================

/// What a diagnostic record is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// `connect` created a transport.
    Connect,
    /// The transport could not be created.
    ConstructionFailed,
    /// The transport opened.
    Open,
    /// The transport closed.
    Close,
    /// The transport failed.
    TransportError,
    /// `disconnect` closed the connection.
    Disconnect,
    /// An inbound frame could not be decoded.
    MalformedFrame,
    /// `send` was refused.
    SendRejected,
    /// An event arrived for a handle that is not live.
    StaleEvent,
    /// A caller hook panicked.
    HookPanicked,
}

impl DiagnosticKind {
    /// Short name used in logs.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::ConstructionFailed => "construction_failed",
            Self::Open => "open",
            Self::Close => "close",
            Self::TransportError => "transport_error",
            Self::Disconnect => "disconnect",
            Self::MalformedFrame => "malformed_frame",
            Self::SendRejected => "send_rejected",
            Self::StaleEvent => "stale_event",
            Self::HookPanicked => "hook_panicked",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Diagnostic
// ============================================================================

/// One structured diagnostic record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// What happened.
    pub kind: DiagnosticKind,
    /// Handle involved, if any.
    pub handle: Option<HandleId>,
    /// State before the event.
    pub from: ConnectionState,
    /// State after the event.
    pub to: ConnectionState,
    /// Error text or other detail.
    pub detail: Option<String>,
}

impl Diagnostic {
    /// Creates a record for a state change (or non-change).
    #[inline]
    #[must_use]
    pub fn new(kind: DiagnosticKind, from: ConnectionState, to: ConnectionState) -> Self {
        Self {
            kind,
            handle: None,
            from,
            to,
            detail: None,
        }
    }

    /// Attaches the handle.
    #[inline]
    #[must_use]
    pub fn handle(mut self, handle: HandleId) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Attaches a detail string.
    #[inline]
    #[must_use]
    pub fn detail(mut self, detail: impl fmt::Display) -> Self {
        self.detail = Some(detail.to_string());
        self
    }

    /// Returns `true` if the record describes a state change.
    #[inline]
    #[must_use]
    pub fn is_transition(&self) -> bool {
        self.from != self.to
    }
}

// ============================================================================
// DiagnosticSink
// ============================================================================

/// Destination for diagnostic records.
///
/// Called synchronously from whichever thread triggered the record; must not
/// call back into the manager.
pub trait DiagnosticSink: Send + Sync {
    /// Records one diagnostic.
    fn record(&self, diagnostic: Diagnostic);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Arc<S> {
    fn record(&self, diagnostic: Diagnostic) {
        (**self).record(diagnostic);
    }
}

// ============================================================================
// TracingSink
// ============================================================================

/// Default sink: emits each record as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, d: Diagnostic) {
        let handle = d.handle.map(|h| h.as_u64());
        let detail = d.detail.as_deref().unwrap_or("");

        match d.kind {
            DiagnosticKind::ConstructionFailed | DiagnosticKind::TransportError => {
                error!(target: "ws_link::manager", kind = %d.kind, ?handle, from = %d.from, to = %d.to, detail, "Connection failure");
            }
            DiagnosticKind::HookPanicked => {
                error!(target: "ws_link::manager", kind = %d.kind, ?handle, state = %d.to, hook = detail, "Hook panicked");
            }
            DiagnosticKind::MalformedFrame => {
                warn!(target: "ws_link::manager", kind = %d.kind, ?handle, state = %d.to, detail, "Inbound frame dropped");
            }
            // Expected whenever callers send without checking state first
            DiagnosticKind::SendRejected => {
                debug!(target: "ws_link::manager", kind = %d.kind, ?handle, state = %d.to, detail, "Send refused");
            }
            DiagnosticKind::StaleEvent => {
                trace!(target: "ws_link::manager", kind = %d.kind, ?handle, detail, "Ignored event");
            }
            _ => {
                debug!(target: "ws_link::manager", kind = %d.kind, ?handle, from = %d.from, to = %d.to, detail, "State transition");
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use parking_lot::Mutex;

    /// Sink that keeps every record for inspection.
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub(crate) records: Mutex<Vec<Diagnostic>>,
    }

    impl RecordingSink {
        pub(crate) fn kinds(&self) -> Vec<DiagnosticKind> {
            self.records.lock().iter().map(|d| d.kind).collect()
        }
    }

    impl DiagnosticSink for RecordingSink {
        fn record(&self, diagnostic: Diagnostic) {
            self.records.lock().push(diagnostic);
        }
    }

    #[test]
    fn test_builder_fields() {
        let d = Diagnostic::new(
            DiagnosticKind::Open,
            ConnectionState::Connecting,
            ConnectionState::Connected,
        )
        .handle(HandleId::new(4))
        .detail("ok");

        assert_eq!(d.handle, Some(HandleId::new(4)));
        assert_eq!(d.detail.as_deref(), Some("ok"));
        assert!(d.is_transition());
    }

    #[test]
    fn test_non_transition() {
        let d = Diagnostic::new(
            DiagnosticKind::MalformedFrame,
            ConnectionState::Connected,
            ConnectionState::Connected,
        );
        assert!(!d.is_transition());
    }

    #[test]
    fn test_tracing_sink_does_not_panic() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("ws_link=trace"))
            .with_test_writer()
            .try_init();

        for kind in [
            DiagnosticKind::Connect,
            DiagnosticKind::ConstructionFailed,
            DiagnosticKind::MalformedFrame,
            DiagnosticKind::StaleEvent,
            DiagnosticKind::HookPanicked,
        ] {
            TracingSink.record(Diagnostic::new(
                kind,
                ConnectionState::Disconnected,
                ConnectionState::Connecting,
            ));
        }
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(DiagnosticKind::ConstructionFailed.to_string(), "construction_failed");
        assert_eq!(DiagnosticKind::StaleEvent.as_str(), "stale_event");
        assert_eq!(DiagnosticKind::HookPanicked.as_str(), "hook_panicked");
    }
}
