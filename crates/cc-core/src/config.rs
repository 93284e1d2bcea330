//! # Harness configuration DTO
//!
//! ## Responsibilities
//!
//! - Define the configuration data structures
//! - Provide the TOML → DTO mapping
//!
//! Missing keys fall back to the constants below. Values are taken as
//! they come: ranges are not validated here, the adapters report what
//! they cannot use.

use serde::{Deserialize, Serialize};

pub const DEFAULT_FIRST_PORT: u16 = 9876;
pub const DEFAULT_PORTS_TRIED: u16 = 10;
pub const DEFAULT_ITERATIONS: usize = 1000;
pub const DEFAULT_PAYLOAD_LEN: usize = 100;
pub const DEFAULT_STABILIZE_ATTEMPTS: u32 = 30;
pub const DEFAULT_STABILIZE_INTERVAL_MS: u64 = 200;
pub const DEFAULT_ACTIVATE_DELAY_MS: u64 = 100;
pub const DEFAULT_TARGET_WINDOW: &str = "SPICEc:0";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub network: NetworkConfig,
    pub run: RunConfig,
    pub stabilize: StabilizeConfig,
    pub clipboard: ClipboardConfig,
    pub activation: ActivationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub first_port: u16,
    pub ports_tried: u16,
    pub bind_address: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            first_port: DEFAULT_FIRST_PORT,
            ports_tried: DEFAULT_PORTS_TRIED,
            bind_address: "0.0.0.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Paste iterations (`-N`)
    pub iterations: usize,
    /// Characters per payload (`-n`)
    pub payload_len: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            payload_len: DEFAULT_PAYLOAD_LEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizeConfig {
    pub max_attempts: u32,
    pub interval_ms: u64,
}

impl Default for StabilizeConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_STABILIZE_ATTEMPTS,
            interval_ms: DEFAULT_STABILIZE_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    /// `clipboard-rs`, `arboard` or `xsel`
    pub backend: String,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            backend: "clipboard-rs".to_string(),
        }
    }
}

/// Window activation used with the xsel backend to push the selection
/// across to the guest viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivationConfig {
    pub enabled: bool,
    /// Prefix of the viewer window title
    pub target_window: String,
    pub target_pre_activate_ms: u64,
    pub target_post_activate_ms: u64,
    pub console_post_activate_ms: u64,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            target_window: DEFAULT_TARGET_WINDOW.to_string(),
            target_pre_activate_ms: DEFAULT_ACTIVATE_DELAY_MS,
            target_post_activate_ms: DEFAULT_ACTIVATE_DELAY_MS,
            console_post_activate_ms: DEFAULT_ACTIVATE_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// File logging is off when unset
    pub directory: Option<String>,
}

impl HarnessConfig {
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
