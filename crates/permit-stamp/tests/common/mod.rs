//! Shared utilities for permit-stamp integration tests.
//!
//! - Builders for raw attachments, stamp definitions and settings
//! - `ScriptedTransport`, an in-memory command/query endpoint

pub mod builders;
pub mod transport;

pub use builders::*;
pub use transport::{update, ScriptedTransport};
