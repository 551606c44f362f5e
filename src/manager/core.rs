//! Connection manager.
//!
//! The [`ConnectionManager`] owns at most one transport handle and exposes a
//! coarse lifecycle state plus `connect` / `disconnect` / `send`.
//!
//! # Example
//!
//! ```no_run
//! use ws_link::{ConnectionManager, Message};
//!
//! # async fn example() -> ws_link::Result<()> {
//! let manager = ConnectionManager::builder()
//!     .on_message(|message| println!("received {message}"))
//!     .build()?;
//!
//! manager.connect("ws://127.0.0.1:9000/socket");
//! let mut state = manager.watch_state();
//! state.wait_for(|s| s.is_settled()).await.ok();
//!
//! if !manager.send(&Message::new("ping"))? {
//!     println!("not connected");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Event Ordering
//!
//! Event dispatch and `connect` / `disconnect` are serialized. Once `connect`
//! returns, nothing from an older handle reaches a hook. Hooks run without any
//! internal lock held besides that serialization, so they may call back into
//! the manager from the same thread.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex, RwLock};
use serde::Serialize;
use tokio::sync::watch;
use tracing::trace;

use crate::error::{Error, Result};
use crate::identifiers::HandleId;
use crate::protocol::{Message, decode_frame, encode_frame};
use crate::transport::events::EventTarget;
use crate::transport::{
    CloseInfo, Transport, TransportEvent, TransportEvents, TransportFactory, WsTransportFactory,
};

use super::builder::ManagerBuilder;
use super::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, TracingSink};
use super::hooks::Hooks;
use super::state::ConnectionState;

// ============================================================================
// LiveTransport
// ============================================================================

/// The installed transport handle.
struct LiveTransport {
    id: HandleId,
    address: String,
    transport: Box<dyn Transport>,
    events: TransportEvents,
}

impl LiveTransport {
    /// Detaches the listener, then closes the transport.
    fn release(mut self) {
        self.events.detach();
        self.transport.close();
    }
}

// ============================================================================
// Inner
// ============================================================================

/// Mutable lifecycle data.
struct Inner {
    /// Current lifecycle state.
    state: ConnectionState,
    /// Last id handed out.
    last_handle: HandleId,
    /// Handle whose events are accepted. Set before the transport exists.
    active: Option<HandleId>,
    /// Installed transport, if any.
    live: Option<LiveTransport>,
}

// ============================================================================
// Shared
// ============================================================================

/// State shared between the manager and transport listeners.
struct Shared {
    inner: Mutex<Inner>,
    hooks: RwLock<Hooks>,
    factory: Arc<dyn TransportFactory>,
    diagnostics: Arc<dyn DiagnosticSink>,
    /// Serializes event dispatch against connect/disconnect.
    dispatch: ReentrantMutex<()>,
    state_tx: watch::Sender<ConnectionState>,
}

impl Shared {
    /// Updates the state and notifies watchers. Caller holds `inner`.
    fn set_state(&self, inner: &mut Inner, state: ConnectionState) {
        inner.state = state;
        self.state_tx.send_replace(state);
    }

    fn record(&self, diagnostic: Diagnostic) {
        self.diagnostics.record(diagnostic);
    }

    /// Runs a caller hook, containing any panic.
    ///
    /// Hooks run on the transport's task; a panic escaping here would kill
    /// that task without a close or error event.
    fn run_hook(&self, handle: HandleId, name: &str, hook: impl FnOnce()) {
        if panic::catch_unwind(AssertUnwindSafe(hook)).is_err() {
            let state = self.inner.lock().state;
            self.record(
                Diagnostic::new(DiagnosticKind::HookPanicked, state, state)
                    .handle(handle)
                    .detail(name),
            );
        }
    }

    /// Reports an event for a handle that is no longer live.
    fn record_stale(&self, handle: HandleId, event: &str, state: ConnectionState) {
        self.record(
            Diagnostic::new(DiagnosticKind::StaleEvent, state, state)
                .handle(handle)
                .detail(event),
        );
    }

    fn handle_open(&self, handle: HandleId) {
        let from = {
            let mut inner = self.inner.lock();
            let from = inner.state;
            if inner.active != Some(handle) || from != ConnectionState::Connecting {
                drop(inner);
                self.record_stale(handle, "open", from);
                return;
            }
            self.set_state(&mut inner, ConnectionState::Connected);
            from
        };

        self.record(Diagnostic::new(DiagnosticKind::Open, from, ConnectionState::Connected).handle(handle));

        let hook = self.hooks.read().on_open.clone();
        if let Some(hook) = hook {
            self.run_hook(handle, "on_open", || hook());
        }
    }

    fn handle_message(&self, handle: HandleId, text: &str) {
        let state = {
            let inner = self.inner.lock();
            if inner.active != Some(handle) {
                let state = inner.state;
                drop(inner);
                self.record_stale(handle, "message", state);
                return;
            }
            inner.state
        };

        match decode_frame(text) {
            Ok(message) => {
                trace!(%handle, kind = ?message.kind(), "Message decoded");
                let hook = self.hooks.read().on_message.clone();
                if let Some(hook) = hook {
                    self.run_hook(handle, "on_message", || hook(message));
                }
            }
            Err(e) => {
                self.record(
                    Diagnostic::new(DiagnosticKind::MalformedFrame, state, state)
                        .handle(handle)
                        .detail(e),
                );
            }
        }
    }

    fn handle_close(&self, handle: HandleId, info: CloseInfo) {
        let (from, live) = {
            let mut inner = self.inner.lock();
            let from = inner.state;
            if inner.active != Some(handle) {
                drop(inner);
                self.record_stale(handle, "close", from);
                return;
            }
            inner.active = None;
            let live = inner.live.take();
            self.set_state(&mut inner, ConnectionState::Disconnected);
            (from, live)
        };

        if let Some(live) = live {
            live.release();
        }

        self.record(
            Diagnostic::new(DiagnosticKind::Close, from, ConnectionState::Disconnected)
                .handle(handle)
                .detail(info),
        );

        let hook = self.hooks.read().on_close.clone();
        if let Some(hook) = hook {
            self.run_hook(handle, "on_close", || hook());
        }
    }

    fn handle_error(&self, handle: HandleId, error: Error) {
        let (from, live) = {
            let mut inner = self.inner.lock();
            let from = inner.state;
            if inner.active != Some(handle) {
                drop(inner);
                self.record_stale(handle, "error", from);
                return;
            }
            inner.active = None;
            let live = inner.live.take();
            self.set_state(&mut inner, ConnectionState::Error);
            (from, live)
        };

        if let Some(live) = live {
            live.release();
        }

        self.record(
            Diagnostic::new(DiagnosticKind::TransportError, from, ConnectionState::Error)
                .handle(handle)
                .detail(&error),
        );

        let hook = self.hooks.read().on_error.clone();
        if let Some(hook) = hook {
            self.run_hook(handle, "on_error", || hook(&error));
        }
    }
}

impl EventTarget for Shared {
    fn deliver(&self, handle: HandleId, event: TransportEvent) {
        let _dispatch = self.dispatch.lock();

        match event {
            TransportEvent::Open => self.handle_open(handle),
            TransportEvent::Message(text) => self.handle_message(handle, &text),
            TransportEvent::Error(error) => self.handle_error(handle, error),
            TransportEvent::Close(info) => self.handle_close(handle, info),
        }
    }
}

// ============================================================================
// ConnectionManager
// ============================================================================

/// Manages one persistent message-stream connection.
///
/// Owns at most one transport handle. Dropping the manager closes it.
///
/// # Thread Safety
///
/// `ConnectionManager` is `Send + Sync`. Share it behind an `Arc` if several
/// tasks need it; it is deliberately not `Clone` since dropping it tears the
/// connection down.
pub struct ConnectionManager {
    shared: Arc<Shared>,
}

// ============================================================================
// ConnectionManager - Constructors
// ============================================================================

impl ConnectionManager {
    /// Creates a manager with no hooks and the WebSocket transport.
    #[must_use]
    pub fn new() -> Self {
        Self::new_with(
            Arc::new(WsTransportFactory::default()),
            Arc::new(TracingSink),
            Hooks::new(),
        )
    }

    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> ManagerBuilder {
        ManagerBuilder::new()
    }

    pub(crate) fn new_with(
        factory: Arc<dyn TransportFactory>,
        diagnostics: Arc<dyn DiagnosticSink>,
        hooks: Hooks,
    ) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);

        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    state: ConnectionState::Disconnected,
                    last_handle: HandleId::new(0),
                    active: None,
                    live: None,
                }),
                hooks: RwLock::new(hooks),
                factory,
                diagnostics,
                dispatch: ReentrantMutex::new(()),
                state_tx,
            }),
        }
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// ConnectionManager - State
// ============================================================================

impl ConnectionManager {
    /// Returns the current lifecycle state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.shared.inner.lock().state
    }

    /// Returns `true` if the state is [`ConnectionState::Connected`].
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Returns the handle whose events are currently accepted.
    #[must_use]
    pub fn active_handle(&self) -> Option<HandleId> {
        self.shared.inner.lock().active
    }

    /// Returns the address of the installed transport.
    #[must_use]
    pub fn address(&self) -> Option<String> {
        self.shared
            .inner
            .lock()
            .live
            .as_ref()
            .map(|live| live.address.clone())
    }

    /// Subscribes to state changes.
    ///
    /// The receiver starts at the current state.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state_tx.subscribe()
    }
}

// ============================================================================
// ConnectionManager - Hooks
// ============================================================================

impl ConnectionManager {
    /// Replaces the hook set. The transport is left untouched.
    pub fn set_hooks(&self, hooks: Hooks) {
        *self.shared.hooks.write() = hooks;
    }

    /// Edits a copy of the hook set, then installs it.
    ///
    /// `update` runs without any lock held and may call back into the
    /// manager. Concurrent updates race; the last one to finish wins.
    pub fn update_hooks(&self, update: impl FnOnce(&mut Hooks)) {
        let mut hooks = self.hooks();
        update(&mut hooks);
        self.set_hooks(hooks);
    }

    /// Returns a copy of the current hook set.
    #[must_use]
    pub fn hooks(&self) -> Hooks {
        self.shared.hooks.read().clone()
    }
}

// ============================================================================
// ConnectionManager - Lifecycle
// ============================================================================

impl ConnectionManager {
    /// Opens a connection to `address`, closing any existing one first.
    ///
    /// The state becomes [`ConnectionState::Connecting`] immediately. If the
    /// transport cannot be created the state becomes
    /// [`ConnectionState::Error`] and the failure is reported to the
    /// diagnostics sink; nothing is returned to the caller.
    pub fn connect(&self, address: impl AsRef<str>) {
        let address = address.as_ref();
        let shared = &self.shared;
        let _dispatch = shared.dispatch.lock();

        let (id, from, previous) = {
            let mut inner = shared.inner.lock();
            let from = inner.state;
            let id = inner.last_handle.next();
            inner.last_handle = id;
            inner.active = Some(id);
            let previous = inner.live.take();
            shared.set_state(&mut inner, ConnectionState::Connecting);
            (id, from, previous)
        };

        if let Some(previous) = previous {
            trace!(old = %previous.id, new = %id, "Replacing transport");
            previous.release();
        }

        shared.record(
            Diagnostic::new(DiagnosticKind::Connect, from, ConnectionState::Connecting)
                .handle(id)
                .detail(address),
        );

        let target: Weak<Shared> = Arc::downgrade(shared);
        let target: Weak<dyn EventTarget> = target;
        let events = TransportEvents::attach(id, target);

        match shared.factory.create(address, events.clone()) {
            Ok(transport) => {
                let live = LiveTransport {
                    id,
                    address: address.to_string(),
                    transport,
                    events,
                };

                let mut inner = shared.inner.lock();
                if inner.active == Some(id) {
                    inner.live = Some(live);
                } else {
                    // Closed or failed while being created
                    drop(inner);
                    live.release();
                }
            }
            Err(e) => {
                events.detach();

                let from = {
                    let mut inner = shared.inner.lock();
                    let from = inner.state;
                    if inner.active == Some(id) {
                        inner.active = None;
                        shared.set_state(&mut inner, ConnectionState::Error);
                    }
                    from
                };

                shared.record(
                    Diagnostic::new(DiagnosticKind::ConstructionFailed, from, self.state())
                        .handle(id)
                        .detail(&e),
                );
            }
        }
    }

    /// Closes the connection, if any. Always safe to call.
    ///
    /// The state becomes [`ConnectionState::Disconnected`] immediately and no
    /// hook is invoked. Calling it while already disconnected does nothing.
    pub fn disconnect(&self) {
        let shared = &self.shared;
        let _dispatch = shared.dispatch.lock();

        let (from, previous) = {
            let mut inner = shared.inner.lock();
            let from = inner.state;
            if from == ConnectionState::Disconnected && inner.active.is_none() {
                return;
            }
            inner.active = None;
            let previous = inner.live.take();
            shared.set_state(&mut inner, ConnectionState::Disconnected);
            (from, previous)
        };

        let handle = previous.as_ref().map(|live| live.id);
        if let Some(previous) = previous {
            previous.release();
        }

        let mut diagnostic =
            Diagnostic::new(DiagnosticKind::Disconnect, from, ConnectionState::Disconnected);
        if let Some(handle) = handle {
            diagnostic = diagnostic.handle(handle);
        }
        shared.record(diagnostic);
    }
}

// ============================================================================
// ConnectionManager - Messaging
// ============================================================================

impl ConnectionManager {
    /// Serializes `message` and writes it as one text frame.
    ///
    /// Returns `Ok(false)` without writing anything when the connection is
    /// not open. Hooks are not involved either way.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the message cannot be serialized.
    pub fn send<T: Serialize + ?Sized>(&self, message: &T) -> Result<bool> {
        let shared = &self.shared;

        let handle = {
            let inner = shared.inner.lock();
            let ready = inner.state == ConnectionState::Connected
                && inner
                    .live
                    .as_ref()
                    .is_some_and(|live| live.transport.is_ready());

            if !ready {
                let state = inner.state;
                drop(inner);
                shared.record(
                    Diagnostic::new(DiagnosticKind::SendRejected, state, state).detail("not connected"),
                );
                return Ok(false);
            }
            inner.live.as_ref().map(|live| live.id)
        };

        // Serialize without holding the lock
        let frame = encode_frame(message)?;

        let result = {
            let inner = shared.inner.lock();
            match inner.live.as_ref() {
                Some(live) if Some(live.id) == handle && inner.state == ConnectionState::Connected => {
                    live.transport.send_text(frame)
                }
                _ => Err(Error::ConnectionClosed),
            }
        };

        match result {
            Ok(()) => {
                trace!(handle = ?handle, "Frame written");
                Ok(true)
            }
            Err(e) => {
                let state = self.state();
                let mut diagnostic =
                    Diagnostic::new(DiagnosticKind::SendRejected, state, state).detail(&e);
                if let Some(handle) = handle {
                    diagnostic = diagnostic.handle(handle);
                }
                shared.record(diagnostic);
                Ok(false)
            }
        }
    }

    /// Sends a [`Message`].
    ///
    /// # Errors
    ///
    /// See [`ConnectionManager::send`].
    #[inline]
    pub fn send_message(&self, message: &Message) -> Result<bool> {
        self.send(message)
    }
}

// ============================================================================
// Trait Implementations
// ============================================================================

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.inner.lock();
        f.debug_struct("ConnectionManager")
            .field("state", &inner.state)
            .field("active", &inner.active)
            .field("address", &inner.live.as_ref().map(|live| live.address.as_str()))
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
