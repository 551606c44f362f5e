//! Connection manager and its configuration.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `builder` | [`ManagerBuilder`] |
//! | `core` | [`ConnectionManager`] state machine |
//! | `diagnostics` | Structured records and sinks |
//! | `hooks` | Caller callbacks |
//! | `state` | [`ConnectionState`] |

// ============================================================================
// Submodules
// ============================================================================

/// Builder pattern for manager configuration.
pub mod builder;

/// Connection manager state machine.
pub mod core;

/// Diagnostic records and sinks.
pub mod diagnostics;

/// Caller-supplied lifecycle callbacks.
pub mod hooks;

/// Connection lifecycle state.
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ManagerBuilder;
pub use core::ConnectionManager;
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, TracingSink};
pub use hooks::{CloseHook, ErrorHook, Hooks, MessageHook, OpenHook};
pub use state::ConnectionState;
