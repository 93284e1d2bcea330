//! X11 selection served by an `xsel` helper process.
//!
//! `xsel --nodetach --input` keeps the selection alive only while the
//! process runs, so the session owns the helper: each `set` replaces the
//! previous helper and dropping the session terminates the last one.

use super::activation::WindowActivator;
use anyhow::{anyhow, bail, Context, Result};
use cc_core::ports::ClipboardPort;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use tracing::{debug, warn};

const XSEL: &str = "xsel";

pub struct XselSession {
    program: PathBuf,
    helper: Mutex<Option<Child>>,
    activator: Option<WindowActivator>,
}

impl XselSession {
    pub fn new(activator: Option<WindowActivator>) -> Self {
        Self::with_program(XSEL, activator)
    }

    pub fn with_program(program: impl Into<PathBuf>, activator: Option<WindowActivator>) -> Self {
        Self {
            program: program.into(),
            helper: Mutex::new(None),
            activator,
        }
    }

    #[cfg(test)]
    fn has_helper(&self) -> bool {
        self.helper
            .lock()
            .map(|helper| helper.is_some())
            .unwrap_or(false)
    }

    fn spawn_helper(&self, text: &str) -> Result<Child> {
        let mut child = Command::new(&self.program)
            .args(["--nodetach", "--input"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to spawn {}", self.program.display()))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("xsel helper has no stdin"))?;
        if let Err(e) = stdin.write_all(text.as_bytes()) {
            terminate(&mut child);
            return Err(anyhow!(e).context("failed to write to xsel helper"));
        }
        // Closing stdin lets xsel take ownership of the selection.
        drop(stdin);

        debug!(pid = child.id(), len = text.len(), "xsel helper serving selection");
        Ok(child)
    }
}

impl ClipboardPort for XselSession {
    fn get(&self) -> Result<String> {
        let output = Command::new(&self.program)
            .arg("--output")
            .output()
            .with_context(|| format!("failed to run {}", self.program.display()))?;
        if !output.status.success() {
            bail!("{} --output exited with {}", self.program.display(), output.status);
        }
        // Invalid UTF-8 becomes U+FFFD, so the digest covers the lossy text.
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn set(&self, text: &str) -> Result<()> {
        {
            let mut helper = self
                .helper
                .lock()
                .map_err(|_| anyhow!("xsel helper lock poisoned"))?;
            if let Some(mut previous) = helper.take() {
                terminate(&mut previous);
            }
            *helper = Some(self.spawn_helper(text)?);
        }

        if let Some(activator) = &self.activator {
            activator.cycle()?;
        }
        Ok(())
    }
}

impl Drop for XselSession {
    fn drop(&mut self) {
        let helper = match self.helper.get_mut() {
            Ok(helper) => helper,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(mut child) = helper.take() {
            terminate(&mut child);
        }
    }
}

fn terminate(child: &mut Child) {
    debug!(pid = child.id(), "terminating xsel helper");
    if let Err(e) = child.kill() {
        // Already exited.
        debug!(pid = child.id(), error = %e, "kill failed");
    }
    if let Err(e) = child.wait() {
        warn!(pid = child.id(), error = %e, "failed to reap xsel helper");
    }
}
