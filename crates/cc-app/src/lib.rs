//! clipcheck application layer
//!
//! This crate contains the paste and sign loops and the envelope I/O they
//! drive over a byte stream.

pub mod usecases;
pub mod wire;

pub use usecases::{PastePlan, PasteRoleUseCase, SignRoleUseCase, StabilizePolicy};
pub use wire::EnvelopeStream;
