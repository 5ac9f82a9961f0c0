//! AWS-oriented adapters and handlers for the storage/queue relay.
//!
//! This crate owns runtime integration details (Lambda handlers, parameter
//! store, object storage, and queue adapters). Validation and payload rules
//! come from `relay_core`.

pub mod adapters;
pub mod generator;
pub mod handlers;
pub mod settings;
pub mod telemetry;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
