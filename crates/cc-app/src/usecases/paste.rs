use super::write_clipboard;
use crate::wire::EnvelopeStream;
use anyhow::Result;
use cc_core::ports::ClipboardPort;
use cc_core::{Digest, Envelope, PasteOutcome, PasteReport, ProtocolError, TestPayload};
use rand::Rng;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PastePlan {
    /// Number of round trips
    pub iterations: usize,
    /// Characters per payload
    pub payload_len: usize,
}

/// Puts generated payloads on the local clipboard and asks the peer to
/// confirm it observed the same content. Stops at the first wrong digest.
pub struct PasteRoleUseCase {
    clipboard: Arc<dyn ClipboardPort>,
}

impl PasteRoleUseCase {
    pub fn new(clipboard: Arc<dyn ClipboardPort>) -> Self {
        Self { clipboard }
    }

    pub async fn execute<S, R>(
        &self,
        stream: &mut EnvelopeStream<S>,
        plan: PastePlan,
        rng: &mut R,
    ) -> Result<PasteReport>
    where
        S: AsyncRead + AsyncWrite + Unpin,
        R: Rng + ?Sized,
    {
        info!(
            iterations = plan.iterations,
            payload_len = plan.payload_len,
            ">>> start pasting <<<"
        );

        for iteration in 0..plan.iterations {
            if iteration % 10 == 0 {
                info!("{}/{}", iteration, plan.iterations);
            }

            let payload = TestPayload::random(plan.payload_len, rng);
            let digest = Digest::of(payload.as_str().as_bytes());
            write_clipboard(&self.clipboard, payload.as_str().to_owned()).await?;

            stream
                .send(&Envelope::Paste {
                    digest: digest.clone(),
                    payload: payload.into_string(),
                })
                .await?;

            let answer = match stream.receive().await? {
                Some(Envelope::Signed { digest }) => digest,
                Some(other) => {
                    return Err(ProtocolError::UnexpectedEnvelope {
                        expected: "signed",
                        actual: other.name(),
                    }
                    .into())
                }
                None => {
                    info!(completed = iteration, "socket closed, exiting");
                    return Ok(PasteReport {
                        completed: iteration,
                        outcome: PasteOutcome::PeerClosed,
                    });
                }
            };

            if answer != digest {
                warn!(
                    iteration = iteration,
                    expected = %digest,
                    actual = %answer,
                    "{}: failed: sent {}, got {}",
                    iteration,
                    digest,
                    answer
                );
                return Ok(PasteReport {
                    completed: iteration,
                    outcome: PasteOutcome::Mismatch {
                        iteration,
                        expected: digest,
                        actual: answer,
                    },
                });
            }
        }

        info!("{} passed", plan.iterations);
        Ok(PasteReport {
            completed: plan.iterations,
            outcome: PasteOutcome::Passed,
        })
    }
}
