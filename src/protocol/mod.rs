//! Wire protocol.
//!
//! One text frame carries exactly one JSON message:
//!
//! | Direction | Shape |
//! |-----------|-------|
//! | Outbound | `{ "type": "ping", ... }` |
//! | Inbound | any JSON value, passed on unchanged |
//!
//! There is no compression, fragmentation handling, or version negotiation
//! at this layer.

// ============================================================================
// Submodules
// ============================================================================

/// Message type and frame codec.
pub mod message;

// ============================================================================
// Re-exports
// ============================================================================

pub use message::{Message, TYPE_FIELD, decode_frame, encode_frame};
