//! Shared storage/queue relay domain primitives.
//!
//! This crate owns event contracts, validation guards, the JSON payload codec,
//! and the error taxonomy used by both relay functions. It intentionally
//! excludes AWS SDK and Lambda runtime concerns; those live in `relay_lambda`.

pub mod contract;
pub mod error;
pub mod gateway;
pub mod parameters;
pub mod payload;
pub mod validation;

pub use error::{ErrorCategory, RelayError};
