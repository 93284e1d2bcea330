//! Waiting for a freshly propagated clipboard to settle.
//!
//! Right after the peer pastes, the local clipboard can still show the
//! previous value or something that is not a payload at all. The cause of
//! that delay is not understood; the bounded retry only absorbs it, and the
//! digest comparison afterwards reports anything it did not absorb.

use super::{preview, read_clipboard};
use cc_core::config::StabilizeConfig;
use cc_core::ports::ClipboardPort;
use cc_core::{is_decimal_digits, StabilizedRead};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilizePolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for StabilizePolicy {
    fn default() -> Self {
        Self::from(&StabilizeConfig::default())
    }
}

impl From<&StabilizeConfig> for StabilizePolicy {
    fn from(config: &StabilizeConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            interval: Duration::from_millis(config.interval_ms),
        }
    }
}

fn unsettled(content: &str, last: &str) -> bool {
    content == last || !is_decimal_digits(content)
}

fn settled(content: Option<&str>, last: &str) -> bool {
    matches!(content, Some(c) if !unsettled(c, last))
}

/// One read; a failed read counts as "nothing seen yet".
async fn try_read(clipboard: &Arc<dyn ClipboardPort>, attempt: u32) -> Option<String> {
    match read_clipboard(clipboard).await {
        Ok(content) => Some(content),
        Err(e) => {
            debug!(attempt = attempt, error = %format!("{e:#}"), "clipboard read failed");
            None
        }
    }
}

/// Read the clipboard, re-reading while it still equals `last`, holds
/// non-digits or cannot be read, at most `policy.max_attempts` extra times.
///
/// When the budget runs out the last successful read is returned, or an
/// empty string if every read failed.
pub async fn read_stable(
    clipboard: &Arc<dyn ClipboardPort>,
    last: &str,
    policy: StabilizePolicy,
) -> StabilizedRead {
    let mut content = try_read(clipboard, 0).await;
    let mut attempts = 0;

    while !settled(content.as_deref(), last) && attempts < policy.max_attempts {
        attempts += 1;
        debug!(
            attempt = attempts,
            preview = %preview(content.as_deref().unwrap_or_default(), 20),
            "clipboard not settled, retrying"
        );
        tokio::time::sleep(policy.interval).await;
        if let Some(fresh) = try_read(clipboard, attempts).await {
            content = Some(fresh);
        }
    }

    StabilizedRead {
        stabilized: settled(content.as_deref(), last),
        content: content.unwrap_or_default(),
        attempts,
    }
}
