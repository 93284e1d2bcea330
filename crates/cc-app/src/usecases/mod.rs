pub mod paste;
pub mod sign;
pub mod single_shot;
pub mod stabilize;

pub use paste::{PastePlan, PasteRoleUseCase};
pub use sign::SignRoleUseCase;
pub use single_shot::{get_once, paste_once, ClipboardReading};
pub use stabilize::{read_stable, StabilizePolicy};

use anyhow::{Context, Result};
use cc_core::ports::ClipboardPort;
use std::sync::Arc;
use tokio::task::spawn_blocking;

/// Run a clipboard read off the async thread.
pub(crate) async fn read_clipboard(clipboard: &Arc<dyn ClipboardPort>) -> Result<String> {
    let clipboard = Arc::clone(clipboard);
    spawn_blocking(move || clipboard.get())
        .await
        .context("clipboard read task failed")?
        .context("failed to read clipboard")
}

/// Run a clipboard write off the async thread.
pub(crate) async fn write_clipboard(clipboard: &Arc<dyn ClipboardPort>, text: String) -> Result<()> {
    let clipboard = Arc::clone(clipboard);
    spawn_blocking(move || clipboard.set(&text))
        .await
        .context("clipboard write task failed")?
        .context("failed to write clipboard")
}

/// First `max` characters, for log lines.
pub(crate) fn preview(text: &str, max: usize) -> String {
    let mut out: String = text.chars().take(max).collect();
    if text.chars().count() > max {
        out.push_str("...");
    }
    out
}
