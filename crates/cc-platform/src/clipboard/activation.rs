//! Window activation glue for the xsel backend.
//!
//! Setting the X selection alone does not reach the guest: the viewer
//! window has to gain focus before it grabs the new selection. After
//! every paste the viewer window is activated, then focus goes back to the
//! console window that was active at startup. Both windows are resolved
//! once with `xdotool`.

use anyhow::{anyhow, bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

const XDOTOOL: &str = "xdotool";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationDelays {
    pub target_pre: Duration,
    pub target_post: Duration,
    pub console_post: Duration,
}

impl Default for ActivationDelays {
    fn default() -> Self {
        let delay = Duration::from_millis(cc_core::config::DEFAULT_ACTIVATE_DELAY_MS);
        Self {
            target_pre: delay,
            target_post: delay,
            console_post: delay,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WindowActivator {
    program: PathBuf,
    target: String,
    console: String,
    delays: ActivationDelays,
}

impl WindowActivator {
    /// Find the single window whose title starts with `title_prefix` and
    /// remember the currently active window as the console.
    pub fn discover(title_prefix: &str, delays: ActivationDelays) -> Result<Self> {
        let program = PathBuf::from(XDOTOOL);

        let search = run(&program, &["search", "--name", &title_pattern(title_prefix)])
            .context("failed to look up the viewer window")?;
        let target = select_single(parse_window_ids(&search), title_prefix)?;

        let console = parse_window_ids(
            &run(&program, &["getactivewindow"]).context("failed to read the active window")?,
        )
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("xdotool reported no active window"))?;

        info!(viewer = %target, console = %console, "window activation ready");
        Ok(Self {
            program,
            target,
            console,
            delays,
        })
    }

    /// Focus the viewer, then hand focus back to the console.
    pub fn cycle(&self) -> Result<()> {
        thread::sleep(self.delays.target_pre);
        self.activate(&self.target)?;
        thread::sleep(self.delays.target_post);
        self.activate(&self.console)?;
        thread::sleep(self.delays.console_post);
        Ok(())
    }

    fn activate(&self, window: &str) -> Result<()> {
        debug!(window = %window, "activating window");
        run(&self.program, &["windowactivate", window])
            .with_context(|| format!("failed to activate window {window}"))?;
        Ok(())
    }
}

fn run(program: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("failed to run {}", program.display()))?;
    if !output.status.success() {
        bail!(
            "{} {} exited with {}",
            program.display(),
            args.join(" "),
            output.status
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Anchored regex matching titles that start with `prefix`.
fn title_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 8);
    pattern.push('^');
    for c in prefix.chars() {
        if "\\.+*?()|[]{}^$".contains(c) {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern
}

fn parse_window_ids(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
        .collect()
}

fn select_single(mut ids: Vec<String>, title_prefix: &str) -> Result<String> {
    match ids.len() {
        0 => bail!("no window titled '{title_prefix}*' found"),
        1 => Ok(ids.remove(0)),
        n => bail!("{n} windows titled '{title_prefix}*' found, expected exactly one"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_pattern_escapes_regex_chars() {
        assert_eq!(title_pattern("SPICEc:0"), "^SPICEc:0");
        assert_eq!(title_pattern("a.b (1)"), "^a\\.b \\(1\\)");
    }

    #[test]
    fn test_parse_window_ids_skips_noise() {
        let stdout = "41943047\n\n  41943055 \nDefaulting to search window name\n";
        assert_eq!(parse_window_ids(stdout), vec!["41943047", "41943055"]);
    }

    #[test]
    fn test_select_single_requires_exactly_one() {
        assert_eq!(
            select_single(vec!["7".into()], "SPICEc:0").unwrap(),
            "7".to_string()
        );

        let none = select_single(vec![], "SPICEc:0").unwrap_err();
        assert!(none.to_string().contains("no window"));

        let many = select_single(vec!["1".into(), "2".into()], "SPICEc:0").unwrap_err();
        assert!(many.to_string().contains("2 windows"));
    }

    #[test]
    fn test_default_delays() {
        let delays = ActivationDelays::default();
        assert_eq!(delays.target_pre, Duration::from_millis(100));
        assert_eq!(delays.target_post, Duration::from_millis(100));
        assert_eq!(delays.console_post, Duration::from_millis(100));
    }
}
