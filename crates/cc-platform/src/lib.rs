//! # cc-platform
//!
//! Platform-specific implementations for clipcheck.
//!
//! This crate contains the pieces that talk to the operating system: the
//! clipboard backends, the window activation helper and socket setup.

pub mod clipboard;
pub mod net;
