use anyhow::{anyhow, Context, Result};
use cc_core::ports::ClipboardPort;
use std::sync::Mutex;

/// System clipboard through `arboard`.
///
/// On X11 the handle keeps serving what was set for as long as it lives.
pub struct ArboardClipboard {
    inner: Mutex<::arboard::Clipboard>,
}

impl ArboardClipboard {
    pub fn new() -> Result<Self> {
        let clipboard = ::arboard::Clipboard::new().context("arboard::Clipboard::new failed")?;
        Ok(Self {
            inner: Mutex::new(clipboard),
        })
    }
}

impl ClipboardPort for ArboardClipboard {
    fn get(&self) -> Result<String> {
        let mut clipboard = self
            .inner
            .lock()
            .map_err(|_| anyhow!("arboard lock poisoned"))?;
        clipboard.get_text().context("arboard get_text failed")
    }

    fn set(&self, text: &str) -> Result<()> {
        let mut clipboard = self
            .inner
            .lock()
            .map_err(|_| anyhow!("arboard lock poisoned"))?;
        clipboard
            .set_text(text.to_owned())
            .context("arboard set_text failed")
    }
}
