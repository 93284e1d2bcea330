//! One-off clipboard operations for manual checks on a single machine.

use super::{read_clipboard, write_clipboard};
use anyhow::Result;
use cc_core::ports::ClipboardPort;
use cc_core::{Digest, TestPayload};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardReading {
    pub len: usize,
    pub digest: Digest,
}

/// Put a single generated payload on the clipboard, optionally holding the
/// process open for `hold` so the selection stays owned.
pub async fn paste_once<R>(
    clipboard: &Arc<dyn ClipboardPort>,
    payload_len: usize,
    rng: &mut R,
    hold: Option<Duration>,
) -> Result<(Digest, TestPayload)>
where
    R: Rng + ?Sized,
{
    let payload = TestPayload::random(payload_len, rng);
    let digest = Digest::of(payload.as_str().as_bytes());
    write_clipboard(clipboard, payload.as_str().to_owned()).await?;
    info!(len = payload.len(), digest = %digest, "pasted single payload");

    if let Some(hold) = hold {
        tokio::time::sleep(hold).await;
    }
    Ok((digest, payload))
}

/// Read the clipboard once and digest it.
pub async fn get_once(clipboard: &Arc<dyn ClipboardPort>) -> Result<ClipboardReading> {
    let content = read_clipboard(clipboard).await?;
    Ok(ClipboardReading {
        len: content.len(),
        digest: Digest::of(content.as_bytes()),
    })
}
