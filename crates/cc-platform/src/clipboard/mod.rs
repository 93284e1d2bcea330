//! Clipboard backends.
//!
//! The backend is picked once at startup from configuration; the rest of
//! the program only sees [`ClipboardPort`].

pub mod activation;
pub mod arboard;
pub mod native;
pub mod xsel;

use anyhow::{anyhow, Result};
use cc_core::ports::ClipboardPort;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub use self::activation::{ActivationDelays, WindowActivator};
pub use self::arboard::ArboardClipboard;
pub use self::native::ClipboardRsClipboard;
pub use self::xsel::XselSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardBackend {
    /// clipboard-rs system context
    ClipboardRs,
    /// arboard system clipboard
    Arboard,
    /// X11 selection served by an `xsel` helper process
    Xsel,
}

impl FromStr for ClipboardBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clipboard-rs" | "clipboard_rs" | "native" => Ok(Self::ClipboardRs),
            "arboard" => Ok(Self::Arboard),
            "xsel" => Ok(Self::Xsel),
            other => Err(anyhow!(
                "unknown clipboard backend '{other}' (expected clipboard-rs, arboard or xsel)"
            )),
        }
    }
}

impl fmt::Display for ClipboardBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ClipboardRs => "clipboard-rs",
            Self::Arboard => "arboard",
            Self::Xsel => "xsel",
        })
    }
}

/// Open the selected backend.
///
/// `activator` is only honoured by the xsel backend.
pub fn open_clipboard(
    backend: ClipboardBackend,
    activator: Option<WindowActivator>,
) -> Result<Arc<dyn ClipboardPort>> {
    if activator.is_some() && backend != ClipboardBackend::Xsel {
        tracing::warn!(backend = %backend, "window activation ignored for this backend");
    }

    let clipboard: Arc<dyn ClipboardPort> = match backend {
        ClipboardBackend::ClipboardRs => Arc::new(ClipboardRsClipboard::new()?),
        ClipboardBackend::Arboard => Arc::new(ArboardClipboard::new()?),
        ClipboardBackend::Xsel => Arc::new(XselSession::new(activator)),
    };
    tracing::info!(backend = %backend, "clipboard backend ready");
    Ok(clipboard)
}
