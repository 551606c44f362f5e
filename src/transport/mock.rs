//! Scripted transport for tests.
//!
//! [`MockFactory`] records every transport it creates. Tests drive each one
//! by hand through [`MockHandle`], firing the events a real socket would.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::identifiers::HandleId;

use super::events::{CloseInfo, TransportEvents};
use super::handle::{Transport, TransportFactory};

/// Address the factory refuses to build a transport for.
pub(crate) const REJECTED_ADDRESS: &str = "mock://rejected";

// ============================================================================
// Shared State
// ============================================================================

#[derive(Default)]
struct MockState {
    ready: AtomicBool,
    closed: AtomicBool,
    frames: Mutex<Vec<String>>,
}

// ============================================================================
// MockHandle
// ============================================================================

/// Test-side view of one created transport.
#[derive(Clone)]
pub(crate) struct MockHandle {
    pub(crate) address: String,
    events: TransportEvents,
    state: Arc<MockState>,
}

impl MockHandle {
    pub(crate) fn open(&self) {
        self.state.ready.store(true, Ordering::SeqCst);
        self.events.open();
    }

    pub(crate) fn message(&self, text: &str) {
        self.events.message(text);
    }

    pub(crate) fn error(&self, message: &str) {
        self.state.ready.store(false, Ordering::SeqCst);
        self.events.error(Error::connection(message));
    }

    pub(crate) fn remote_close(&self) {
        self.state.ready.store(false, Ordering::SeqCst);
        self.events.close(CloseInfo::new(1000, ""));
    }

    pub(crate) fn id(&self) -> HandleId {
        self.events.handle()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }

    pub(crate) fn is_detached(&self) -> bool {
        self.events.is_detached()
    }

    pub(crate) fn frames(&self) -> Vec<String> {
        self.state.frames.lock().clone()
    }
}

// ============================================================================
// MockTransport
// ============================================================================

struct MockTransport {
    state: Arc<MockState>,
}

impl Transport for MockTransport {
    fn is_ready(&self) -> bool {
        self.state.ready.load(Ordering::SeqCst) && !self.state.closed.load(Ordering::SeqCst)
    }

    fn send_text(&self, frame: String) -> Result<()> {
        if !self.is_ready() {
            return Err(Error::ConnectionClosed);
        }
        self.state.frames.lock().push(frame);
        Ok(())
    }

    fn close(&mut self) {
        self.state.ready.store(false, Ordering::SeqCst);
        self.state.closed.store(true, Ordering::SeqCst);
    }
}

// ============================================================================
// MockFactory
// ============================================================================

/// Factory that hands out [`MockTransport`]s and remembers them.
#[derive(Clone, Default)]
pub(crate) struct MockFactory {
    created: Arc<Mutex<Vec<MockHandle>>>,
}

impl MockFactory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn count(&self) -> usize {
        self.created.lock().len()
    }

    pub(crate) fn handle(&self, index: usize) -> MockHandle {
        self.created.lock()[index].clone()
    }

    pub(crate) fn last(&self) -> MockHandle {
        self.created
            .lock()
            .last()
            .cloned()
            .expect("no transport created yet")
    }

    pub(crate) fn open_count(&self) -> usize {
        self.created.lock().iter().filter(|h| !h.is_closed()).count()
    }
}

impl TransportFactory for MockFactory {
    fn create(&self, address: &str, events: TransportEvents) -> Result<Box<dyn Transport>> {
        if address == REJECTED_ADDRESS {
            return Err(Error::invalid_address(address, "rejected by mock"));
        }

        let state = Arc::new(MockState::default());
        self.created.lock().push(MockHandle {
            address: address.to_string(),
            events,
            state: Arc::clone(&state),
        });

        Ok(Box::new(MockTransport { state }))
    }
}
