//! # cc-core
//!
//! Core domain models for the clipcheck harness.
//!
//! This crate holds the pure pieces of the copy/paste test: payload
//! generation, content digests, the envelope wire model, configuration
//! data and the clipboard port. It performs no I/O.

// Public module exports
pub mod config;
pub mod digest;
pub mod envelope;
pub mod error;
pub mod payload;
pub mod ports;
pub mod report;

// Re-export commonly used types at the crate root
pub use config::HarnessConfig;
pub use digest::Digest;
pub use envelope::Envelope;
pub use error::{ConnectError, ProtocolError};
pub use payload::{is_decimal_digits, TestPayload};
pub use report::{MismatchEvent, MismatchKind, PasteOutcome, PasteReport, SignReport, StabilizedRead};
