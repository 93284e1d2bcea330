//! Messages exchanged over the test socket.
//!
//! Values are written back to back as JSON documents, each followed by a
//! newline. JSON is self-delimiting, so the reader does not need a length
//! prefix: it keeps parsing the accumulated bytes until a whole value is
//! available.

use crate::digest::Digest;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Envelope {
    /// Pasting side → peer: digest and the text that was put on the clipboard.
    Paste { digest: Digest, payload: String },
    /// Signing side → pasting side: digest of what the peer observed.
    Signed { digest: Digest },
}

impl Envelope {
    pub fn name(&self) -> &'static str {
        match self {
            Envelope::Paste { .. } => "paste",
            Envelope::Signed { .. } => "signed",
        }
    }

    /// Serialize into the on-wire form, including the trailing separator.
    pub fn to_wire(&self) -> serde_json::Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}
