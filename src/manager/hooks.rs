//! Caller-supplied lifecycle callbacks.
//!
//! The manager keeps one [`Hooks`] value behind a lock and reads it each time
//! an event is dispatched, so replacing hooks takes effect on the next event
//! without touching the transport.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use crate::error::Error;
use crate::protocol::Message;

// ============================================================================
// Types
// ============================================================================

/// Called when the connection opens.
pub type OpenHook = Arc<dyn Fn() + Send + Sync>;

/// Called with each inbound frame that parsed as JSON.
pub type MessageHook = Arc<dyn Fn(Message) + Send + Sync>;

/// Called when the connection closes.
pub type CloseHook = Arc<dyn Fn() + Send + Sync>;

/// Called with the transport failure that ended the connection.
pub type ErrorHook = Arc<dyn Fn(&Error) + Send + Sync>;

// ============================================================================
// Hooks
// ============================================================================

/// The set of lifecycle callbacks. Every hook is optional.
#[derive(Clone, Default)]
pub struct Hooks {
    pub(crate) on_open: Option<OpenHook>,
    pub(crate) on_message: Option<MessageHook>,
    pub(crate) on_close: Option<CloseHook>,
    pub(crate) on_error: Option<ErrorHook>,
}

impl Hooks {
    /// Creates an empty hook set.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the open hook.
    #[must_use]
    pub fn on_open(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_open = Some(Arc::new(hook));
        self
    }

    /// Sets the message hook.
    #[must_use]
    pub fn on_message(mut self, hook: impl Fn(Message) + Send + Sync + 'static) -> Self {
        self.on_message = Some(Arc::new(hook));
        self
    }

    /// Sets the close hook.
    #[must_use]
    pub fn on_close(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_close = Some(Arc::new(hook));
        self
    }

    /// Sets the error hook.
    #[must_use]
    pub fn on_error(mut self, hook: impl Fn(&Error) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(hook));
        self
    }

    /// Removes every hook.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_open", &self.on_open.is_some())
            .field("on_message", &self.on_message.is_some())
            .field("on_close", &self.on_close.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_hooks() {
        let hooks = Hooks::new();
        assert!(hooks.on_open.is_none());
        assert!(hooks.on_message.is_none());
        assert!(hooks.on_close.is_none());
        assert!(hooks.on_error.is_none());
    }

    #[test]
    fn test_builder_sets_and_clear_removes() {
        let mut hooks = Hooks::new().on_open(|| {}).on_error(|_| {});
        assert_eq!(
            format!("{hooks:?}"),
            "Hooks { on_open: true, on_message: false, on_close: false, on_error: true }"
        );

        hooks.clear();
        assert!(hooks.on_open.is_none());
        assert!(hooks.on_error.is_none());
    }
}
