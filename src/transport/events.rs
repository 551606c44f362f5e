//! Transport-to-manager event delivery.
//!
//! A transport never talks to the manager directly. It receives a
//! [`TransportEvents`] listener bound to its own [`HandleId`] and reports
//! lifecycle changes through it. When the manager replaces or closes the
//! handle it detaches the listener first, after which every call becomes a
//! silent no-op.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::trace;

use crate::error::Error;
use crate::identifiers::HandleId;

// ============================================================================
// CloseInfo
// ============================================================================

/// Close metadata reported by the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloseInfo {
    /// Close code, if the peer sent one.
    pub code: Option<u16>,
    /// Close reason, empty if none was given.
    pub reason: String,
}

impl CloseInfo {
    /// Close with code and reason.
    #[inline]
    #[must_use]
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            reason: reason.into(),
        }
    }

    /// Close without any metadata (stream ended).
    #[inline]
    #[must_use]
    pub fn abrupt() -> Self {
        Self::default()
    }
}

impl fmt::Display for CloseInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.reason.is_empty()) {
            (Some(code), true) => write!(f, "code={code}"),
            (Some(code), false) => write!(f, "code={code} reason={}", self.reason),
            (None, _) => f.write_str("no close frame"),
        }
    }
}

// ============================================================================
// TransportEvent
// ============================================================================

/// A lifecycle event reported by a transport.
#[derive(Debug)]
pub enum TransportEvent {
    /// The connection is established and can carry frames.
    Open,
    /// One text frame arrived.
    Message(String),
    /// The transport failed.
    Error(Error),
    /// The connection closed.
    Close(CloseInfo),
}

impl TransportEvent {
    /// Short name used in logs.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Message(_) => "message",
            Self::Error(_) => "error",
            Self::Close(_) => "close",
        }
    }
}

// ============================================================================
// EventTarget
// ============================================================================

/// Receiver of transport events, implemented by the connection manager.
pub(crate) trait EventTarget: Send + Sync {
    /// Handles one event from the given handle.
    fn deliver(&self, handle: HandleId, event: TransportEvent);
}

// ============================================================================
// TransportEvents
// ============================================================================

/// Listener handed to a transport when it is created.
///
/// Cloning is cheap; all clones share one attachment, so detaching any of
/// them silences all of them.
#[derive(Clone)]
pub struct TransportEvents {
    /// Handle these events belong to.
    handle: HandleId,
    /// Shared attachment, cleared on detach.
    target: Arc<Mutex<Option<Weak<dyn EventTarget>>>>,
}

impl TransportEvents {
    /// Creates a listener attached to `target`.
    pub(crate) fn attach(handle: HandleId, target: Weak<dyn EventTarget>) -> Self {
        Self {
            handle,
            target: Arc::new(Mutex::new(Some(target))),
        }
    }

    /// Detaches the listener. Later events are dropped.
    pub(crate) fn detach(&self) {
        self.target.lock().take();
    }

    /// Returns the handle this listener is bound to.
    #[inline]
    #[must_use]
    pub fn handle(&self) -> HandleId {
        self.handle
    }

    /// Returns `true` once the manager no longer listens.
    ///
    /// Transports may use this to stop work early.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.target
            .lock()
            .as_ref()
            .is_none_or(|target| target.strong_count() == 0)
    }

    /// Reports that the connection is open.
    pub fn open(&self) {
        self.emit(TransportEvent::Open);
    }

    /// Reports one inbound text frame.
    pub fn message(&self, text: impl Into<String>) {
        self.emit(TransportEvent::Message(text.into()));
    }

    /// Reports a transport failure.
    pub fn error(&self, error: Error) {
        self.emit(TransportEvent::Error(error));
    }

    /// Reports that the connection closed.
    pub fn close(&self, info: CloseInfo) {
        self.emit(TransportEvent::Close(info));
    }

    /// Forwards an event if still attached.
    fn emit(&self, event: TransportEvent) {
        // Upgrade under the lock, deliver outside it.
        let target = self.target.lock().as_ref().and_then(Weak::upgrade);

        match target {
            Some(target) => target.deliver(self.handle, event),
            None => trace!(handle = %self.handle, event = event.name(), "Dropped event from detached transport"),
        }
    }
}

impl fmt::Debug for TransportEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportEvents")
            .field("handle", &self.handle)
            .field("detached", &self.is_detached())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Records every delivered event as `(handle, name)`.
    #[derive(Default)]
    pub(crate) struct RecordingTarget {
        pub(crate) events: Mutex<Vec<(HandleId, String)>>,
    }

    impl EventTarget for RecordingTarget {
        fn deliver(&self, handle: HandleId, event: TransportEvent) {
            let label = match event {
                TransportEvent::Message(text) => format!("message:{text}"),
                TransportEvent::Close(info) => format!("close:{info}"),
                other => other.name().to_string(),
            };
            self.events.lock().push((handle, label));
        }
    }

    pub(crate) fn attach_recording(handle: u64) -> (Arc<RecordingTarget>, TransportEvents) {
        let target = Arc::new(RecordingTarget::default());
        let weak: Weak<RecordingTarget> = Arc::downgrade(&target);
        let weak: Weak<dyn EventTarget> = weak;
        let events = TransportEvents::attach(HandleId::new(handle), weak);
        (target, events)
    }

    #[test]
    fn test_events_delivered_while_attached() {
        let (target, events) = attach_recording(1);
        events.open();
        events.message("hi");

        let recorded = target.events.lock().clone();
        assert_eq!(
            recorded,
            vec![
                (HandleId::new(1), "open".to_string()),
                (HandleId::new(1), "message:hi".to_string()),
            ]
        );
    }

    #[test]
    fn test_detach_silences_all_clones() {
        let (target, events) = attach_recording(2);
        let clone = events.clone();

        events.detach();
        clone.open();
        clone.close(CloseInfo::new(1000, "bye"));

        assert!(target.events.lock().is_empty());
        assert!(clone.is_detached());
    }

    #[test]
    fn test_dropped_target_counts_as_detached() {
        let (target, events) = attach_recording(3);
        drop(target);
        assert!(events.is_detached());
        events.open();
    }

    #[test]
    fn test_close_info_display() {
        assert_eq!(CloseInfo::new(1000, "").to_string(), "code=1000");
        assert_eq!(CloseInfo::new(4001, "kicked").to_string(), "code=4001 reason=kicked");
        assert_eq!(CloseInfo::abrupt().to_string(), "no close frame");
    }
}
