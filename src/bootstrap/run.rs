//! Role dispatch: open the clipboard, set up the connection and hand the
//! stream to the paste or sign loop.

use crate::cli::{Behavior, Mode};
use anyhow::{Context, Result};
use cc_app::usecases::{get_once, paste_once, ClipboardReading};
use cc_app::{EnvelopeStream, PastePlan, PasteRoleUseCase, SignRoleUseCase, StabilizePolicy};
use cc_core::ports::ClipboardPort;
use cc_core::{Digest, HarnessConfig, PasteOutcome, PasteReport, SignReport};
use cc_platform::clipboard::{open_clipboard, ActivationDelays, ClipboardBackend, WindowActivator};
use cc_platform::net::{self, PortRange};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{info, info_span, Instrument};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Pasted(PasteReport),
    Signed(SignReport),
    PastedOnce { len: usize, digest: Digest },
    Read(ClipboardReading),
}

impl RunOutcome {
    /// One line for the operator.
    pub fn summary(&self) -> String {
        match self {
            Self::Pasted(report) => match &report.outcome {
                PasteOutcome::Passed => format!("{} passed", report.completed),
                PasteOutcome::Mismatch {
                    iteration,
                    expected,
                    actual,
                } => format!("{iteration}: failed: sent {expected}, got {actual}"),
                PasteOutcome::PeerClosed => {
                    format!("socket closed after {} passed", report.completed)
                }
            },
            Self::Signed(report) => format!(
                "signed {}, {} mismatches",
                report.signed,
                report.mismatches.len()
            ),
            Self::PastedOnce { len, digest } => {
                format!("pasted {len} bytes, digest = {digest}")
            }
            Self::Read(reading) => {
                format!("got {} bytes, digest = {}", reading.len, reading.digest)
            }
        }
    }
}

/// Process exit status for a finished run.
///
/// A digest mismatch ends the paste loop but is still a completed run.
pub fn exit_status(result: &Result<RunOutcome>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

/// Open the configured clipboard backend and run `mode`.
pub async fn run(mode: Mode, config: &HarnessConfig) -> Result<RunOutcome> {
    let host = gethostname::gethostname();
    info!(host = %host.to_string_lossy(), "clipcheck starting");

    let clipboard = open_configured_clipboard(config)?;
    run_with_clipboard(mode, config, clipboard).await
}

fn open_configured_clipboard(config: &HarnessConfig) -> Result<Arc<dyn ClipboardPort>> {
    let backend: ClipboardBackend = config.clipboard.backend.parse()?;

    let activator = if config.activation.enabled {
        let activation = &config.activation;
        let delays = ActivationDelays {
            target_pre: Duration::from_millis(activation.target_pre_activate_ms),
            target_post: Duration::from_millis(activation.target_post_activate_ms),
            console_post: Duration::from_millis(activation.console_post_activate_ms),
        };
        Some(WindowActivator::discover(&activation.target_window, delays)?)
    } else {
        None
    };

    open_clipboard(backend, activator)
        .with_context(|| format!("failed to open clipboard backend {backend}"))
}

/// Run `mode` against an already opened clipboard.
pub async fn run_with_clipboard(
    mode: Mode,
    config: &HarnessConfig,
    clipboard: Arc<dyn ClipboardPort>,
) -> Result<RunOutcome> {
    let range = PortRange::new(config.network.first_port, config.network.ports_tried);

    match mode {
        Mode::PasteOnce { hold } => {
            let mut rng = StdRng::from_os_rng();
            let (digest, payload) =
                paste_once(&clipboard, config.run.payload_len, &mut rng, hold).await?;
            Ok(RunOutcome::PastedOnce {
                len: payload.len(),
                digest,
            })
        }
        Mode::GetOnce => Ok(RunOutcome::Read(get_once(&clipboard).await?)),
        Mode::Listen { behavior } => {
            let bind: IpAddr = config.network.bind_address.parse().with_context(|| {
                format!("invalid bind address: {}", config.network.bind_address)
            })?;
            info!("starting server");
            let accepted = net::listen_and_accept(bind, range).await?;
            let span = info_span!("session", peer = %accepted.peer, port = accepted.port);
            drive(behavior, accepted.stream, config, clipboard)
                .instrument(span)
                .await
        }
        Mode::Connect { dest, behavior } => {
            let (stream, port) = net::connect(&dest, range).await?;
            let span = info_span!("session", peer = %dest, port = port);
            drive(behavior, stream, config, clipboard)
                .instrument(span)
                .await
        }
    }
}

async fn drive(
    behavior: Behavior,
    stream: TcpStream,
    config: &HarnessConfig,
    clipboard: Arc<dyn ClipboardPort>,
) -> Result<RunOutcome> {
    stream.set_nodelay(true).context("failed to set TCP_NODELAY")?;
    let mut stream = EnvelopeStream::new(stream);

    match behavior {
        Behavior::Paste => {
            let plan = PastePlan {
                iterations: config.run.iterations,
                payload_len: config.run.payload_len,
            };
            let mut rng = StdRng::from_os_rng();
            let report = PasteRoleUseCase::new(clipboard)
                .execute(&mut stream, plan, &mut rng)
                .await?;
            Ok(RunOutcome::Pasted(report))
        }
        Behavior::Sign => {
            let policy = StabilizePolicy::from(&config.stabilize);
            let report = SignRoleUseCase::new(clipboard, policy)
                .execute(&mut stream)
                .await?;
            Ok(RunOutcome::Signed(report))
        }
    }
}
