//! Command line surface.
//!
//! Example session, testing paste from the host into the guest:
//!
//! ```text
//! guest$ clipcheck --server
//! host$  clipcheck --client --dest <guest ip> --paste -n 20000
//! ```
//!
//! Put `--paste` on the guest invocation instead to test the other
//! direction.

use anyhow::{bail, Result};
use cc_core::HarnessConfig;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "clipcheck")]
#[command(version, about = "Clipboard synchronization test harness", long_about = None)]
pub struct Cli {
    /// Listen on the port range and wait for one peer
    #[arg(long, conflicts_with = "client")]
    pub server: bool,

    /// Connect to the peer at --dest
    #[arg(long)]
    pub client: bool,

    /// Destination address for --client
    #[arg(long)]
    pub dest: Option<String>,

    /// Paste to the other side (without it, sign what the other side pastes)
    #[arg(long)]
    pub paste: bool,

    /// Paste a single payload locally and exit
    #[arg(long, conflicts_with_all = ["get1", "server", "client"])]
    pub paste1: bool,

    /// Seconds to keep running after --paste1
    #[arg(long, requires = "paste1")]
    pub sleep1: Option<f64>,

    /// Read the local clipboard once, print its length and digest, and exit
    #[arg(long, conflicts_with_all = ["server", "client"])]
    pub get1: bool,

    /// Number of iterations
    #[arg(short = 'N', long = "iterations")]
    pub iterations: Option<usize>,

    /// Length of test strings
    #[arg(short = 'n', long = "length")]
    pub length: Option<usize>,

    /// Be more verbose (repeat for more)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Clipboard backend: clipboard-rs, arboard or xsel
    #[arg(long)]
    pub backend: Option<String>,

    /// Activate the viewer window after each paste (xsel backend)
    #[arg(long)]
    pub activate_window: bool,

    /// Title prefix of the viewer window
    #[arg(long)]
    pub target_window: Option<String>,

    /// Seconds to sleep before viewer activation
    #[arg(long)]
    pub target_pre_activate: Option<f64>,

    /// Seconds to sleep after viewer activation
    #[arg(long)]
    pub target_post_activate: Option<f64>,

    /// Seconds to sleep after console re-activation
    #[arg(long)]
    pub console_post_activate: Option<f64>,

    /// First port of the candidate range
    #[arg(long)]
    pub first_port: Option<u16>,

    /// Number of candidate ports
    #[arg(long)]
    pub ports_tried: Option<u16>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Also write logs to this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Paste,
    Sign,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    PasteOnce { hold: Option<Duration> },
    GetOnce,
    Listen { behavior: Behavior },
    Connect { dest: String, behavior: Behavior },
}

impl Cli {
    pub fn mode(&self) -> Result<Mode> {
        if self.paste1 {
            let hold = match self.sleep1 {
                Some(secs) => Some(seconds(secs, "--sleep1")?),
                None => None,
            };
            return Ok(Mode::PasteOnce { hold });
        }
        if self.get1 {
            return Ok(Mode::GetOnce);
        }

        let behavior = if self.paste {
            Behavior::Paste
        } else {
            Behavior::Sign
        };
        if self.server {
            return Ok(Mode::Listen { behavior });
        }
        match &self.dest {
            Some(dest) => Ok(Mode::Connect {
                dest: dest.clone(),
                behavior,
            }),
            None => bail!("--client requires --dest <address> (or use --server)"),
        }
    }

    /// Layer command line values over the loaded configuration.
    pub fn apply_overrides(&self, config: &mut HarnessConfig) -> Result<()> {
        if let Some(iterations) = self.iterations {
            config.run.iterations = iterations;
        }
        if let Some(length) = self.length {
            config.run.payload_len = length;
        }
        if let Some(backend) = &self.backend {
            config.clipboard.backend = backend.clone();
        }
        if self.activate_window {
            config.activation.enabled = true;
        }
        if let Some(target) = &self.target_window {
            config.activation.target_window = target.clone();
        }
        if let Some(secs) = self.target_pre_activate {
            config.activation.target_pre_activate_ms = millis(secs, "--target-pre-activate")?;
        }
        if let Some(secs) = self.target_post_activate {
            config.activation.target_post_activate_ms = millis(secs, "--target-post-activate")?;
        }
        if let Some(secs) = self.console_post_activate {
            config.activation.console_post_activate_ms = millis(secs, "--console-post-activate")?;
        }
        if let Some(port) = self.first_port {
            config.network.first_port = port;
        }
        if let Some(count) = self.ports_tried {
            config.network.ports_tried = count;
        }
        if let Some(dir) = &self.log_dir {
            config.logging.directory = Some(dir.display().to_string());
        }
        Ok(())
    }
}

fn seconds(secs: f64, flag: &str) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| anyhow::anyhow!("{flag} expects a non-negative number of seconds, got {secs}"))
}

fn millis(secs: f64, flag: &str) -> Result<u64> {
    let millis = seconds(secs, flag)?.as_millis();
    Ok(u64::try_from(millis).unwrap_or(u64::MAX))
}
