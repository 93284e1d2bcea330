use super::preview;
use super::stabilize::{read_stable, StabilizePolicy};
use crate::wire::EnvelopeStream;
use anyhow::Result;
use cc_core::ports::ClipboardPort;
use cc_core::{Digest, Envelope, MismatchEvent, MismatchKind, ProtocolError, SignReport};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, error, info, warn};

/// Reads the local clipboard for every envelope the peer sends and replies
/// with the digest of what it saw.
///
/// Runs until the peer closes the stream. Mismatches are recorded in the
/// report and logged; they never stop the loop.
pub struct SignRoleUseCase {
    clipboard: Arc<dyn ClipboardPort>,
    policy: StabilizePolicy,
}

impl SignRoleUseCase {
    pub fn new(clipboard: Arc<dyn ClipboardPort>, policy: StabilizePolicy) -> Self {
        Self { clipboard, policy }
    }

    pub async fn execute<S>(&self, stream: &mut EnvelopeStream<S>) -> Result<SignReport>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        info!(">>> start signing <<<");

        let mut report = SignReport::default();
        let mut last_observed = String::new();
        let mut iteration: u64 = 0;

        loop {
            iteration += 1;

            let (expected_digest, expected_payload) = match stream.receive().await? {
                Some(Envelope::Paste { digest, payload }) => (digest, payload),
                Some(other) => {
                    return Err(ProtocolError::UnexpectedEnvelope {
                        expected: "paste",
                        actual: other.name(),
                    }
                    .into())
                }
                None => {
                    info!(signed = report.signed, "socket closed, exiting");
                    return Ok(report);
                }
            };

            let read = read_stable(&self.clipboard, &last_observed, self.policy).await;
            if !read.stabilized {
                warn!(
                    iteration = iteration,
                    attempts = read.attempts,
                    "clipboard did not settle, using last read"
                );
            }
            let observed = read.content;

            if observed != expected_payload {
                warn!(
                    iteration = iteration,
                    expected_len = expected_payload.len(),
                    observed_len = observed.len(),
                    expected = %preview(&expected_payload, 40),
                    observed = %preview(&observed, 40),
                    "clipboard differs from pasted payload"
                );
                report.mismatches.push(MismatchEvent::new(
                    iteration,
                    MismatchKind::PayloadMismatch,
                    &expected_payload,
                    &observed,
                ));
            }

            let computed = Digest::of(observed.as_bytes());
            stream
                .send(&Envelope::Signed {
                    digest: computed.clone(),
                })
                .await?;
            report.signed += 1;

            if computed != expected_digest {
                error!(
                    iteration = iteration,
                    expected = %expected_digest,
                    actual = %computed,
                    "{}: error on text of length {}",
                    iteration,
                    observed.len()
                );
                let mut event = MismatchEvent::new(
                    iteration,
                    MismatchKind::DigestMismatch,
                    expected_digest.as_str(),
                    computed.as_str(),
                );
                event.observed_len = observed.len();
                report.mismatches.push(event);
            }

            debug!(iteration = iteration, attempts = read.attempts, "signed");
            last_observed = observed;
        }
    }
}
