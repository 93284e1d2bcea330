//! Outcomes of the paste and sign loops.
//!
//! Mismatches are data, not control flow: the sign loop records them and
//! keeps going, the paste loop stops at the first one.

use crate::digest::Digest;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    /// Clipboard text differs from the payload the peer sent.
    PayloadMismatch,
    /// Digest of the clipboard text differs from the peer's digest.
    DigestMismatch,
}

/// Characters of payload text kept in a [`MismatchEvent`].
pub const MISMATCH_PREVIEW_CHARS: usize = 64;

/// One recorded mismatch.
///
/// `expected` and `observed` hold at most [`MISMATCH_PREVIEW_CHARS`]
/// characters; the full lengths are kept alongside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MismatchEvent {
    pub iteration: u64,
    pub kind: MismatchKind,
    pub expected: String,
    pub expected_len: usize,
    pub observed: String,
    pub observed_len: usize,
}

impl MismatchEvent {
    pub fn new(iteration: u64, kind: MismatchKind, expected: &str, observed: &str) -> Self {
        Self {
            iteration,
            kind,
            expected: clip(expected),
            expected_len: expected.len(),
            observed: clip(observed),
            observed_len: observed.len(),
        }
    }
}

fn clip(text: &str) -> String {
    text.chars().take(MISMATCH_PREVIEW_CHARS).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PasteOutcome {
    Passed,
    Mismatch {
        iteration: usize,
        expected: Digest,
        actual: Digest,
    },
    PeerClosed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasteReport {
    /// Iterations whose digest came back matching
    pub completed: usize,
    pub outcome: PasteOutcome,
}

impl PasteReport {
    pub fn passed(&self) -> bool {
        matches!(self.outcome, PasteOutcome::Passed)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignReport {
    pub signed: u64,
    pub mismatches: Vec<MismatchEvent>,
}

/// Result of waiting for the clipboard to settle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StabilizedRead {
    pub content: String,
    /// Extra reads performed after the first one
    pub attempts: u32,
    /// False when the retry budget ran out
    pub stabilized: bool,
}
