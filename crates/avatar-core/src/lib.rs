//! avatar-core: shared error type, configuration, and media types.
//!
//! This crate is the foundational dependency for the other avatar-* crates,
//! providing the unified error taxonomy (with HTTP status classification),
//! the application configuration, and the allow-listed image media types.

pub mod config;
pub mod error;
pub mod media;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result, WriteOp};
pub use media::ImageMediaType;
