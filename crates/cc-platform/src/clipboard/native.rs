use anyhow::{anyhow, Result};
use cc_core::ports::ClipboardPort;
use clipboard_rs::{Clipboard, ClipboardContext};
use std::sync::Mutex;
use tracing::{debug, debug_span};

fn map_clipboard_err<T>(
    result: std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>,
) -> Result<T> {
    result.map_err(|e| anyhow!(e))
}

/// System clipboard through clipboard-rs
pub struct ClipboardRsClipboard {
    inner: Mutex<ClipboardContext>,
}

impl ClipboardRsClipboard {
    pub fn new() -> Result<Self> {
        let context = ClipboardContext::new()
            .map_err(|e| anyhow!("Failed to create clipboard context: {}", e))?;
        Ok(Self {
            inner: Mutex::new(context),
        })
    }
}

impl ClipboardPort for ClipboardRsClipboard {
    fn get(&self) -> Result<String> {
        let span = debug_span!("platform.clipboard_rs.get");
        span.in_scope(|| {
            let ctx = self
                .inner
                .lock()
                .map_err(|_| anyhow!("clipboard context lock poisoned"))?;
            let text = map_clipboard_err(ctx.get_text())?;
            debug!(len = text.len(), "read clipboard text");
            Ok(text)
        })
    }

    fn set(&self, text: &str) -> Result<()> {
        let span = debug_span!("platform.clipboard_rs.set", len = text.len());
        span.in_scope(|| {
            let ctx = self
                .inner
                .lock()
                .map_err(|_| anyhow!("clipboard context lock poisoned"))?;
            map_clipboard_err(ctx.set_text(text.to_string()))?;
            debug!("wrote clipboard text");
            Ok(())
        })
    }
}
