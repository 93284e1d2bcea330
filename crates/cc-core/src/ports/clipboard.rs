//! Clipboard port - abstracts local clipboard access
//!
//! The harness only ever moves plain text through the single system
//! clipboard slot, so the port is reduced to `get`/`set`.

use anyhow::Result;

/// Clipboard port - abstracts local clipboard access
///
/// Implementations are blocking; use cases call them from
/// `spawn_blocking`.
#[cfg_attr(test, mockall::automock)]
pub trait ClipboardPort: Send + Sync {
    /// Read the current clipboard text.
    fn get(&self) -> Result<String>;

    /// Replace the clipboard content with `text`.
    fn set(&self, text: &str) -> Result<()>;
}
