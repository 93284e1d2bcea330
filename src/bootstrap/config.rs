//! # Configuration loader
//!
//! Reads the TOML file and maps it onto [`HarnessConfig`]. Missing keys
//! take the built-in defaults. No range checks happen here.

use anyhow::Context;
use cc_core::HarnessConfig;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "clipcheck";
const CONFIG_FILE: &str = "config.toml";

/// `<config dir>/clipcheck/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns error if the file cannot be read or is not valid TOML for
/// [`HarnessConfig`].
pub fn load_config(config_path: &Path) -> anyhow::Result<HarnessConfig> {
    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    HarnessConfig::from_toml_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
}

/// Resolve the configuration the process runs with.
///
/// An explicit path must exist. The default path is optional: when no file
/// is there the built-in defaults apply.
pub fn load_effective(explicit: Option<&Path>) -> anyhow::Result<HarnessConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    match default_config_path() {
        Some(path) if path.is_file() => load_config(&path),
        _ => Ok(HarnessConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_reads_valid_toml() {
        let toml_content = r#"
            [network]
            first_port = 12000
            ports_tried = 4

            [run]
            iterations = 50
            payload_len = 2048

            [clipboard]
            backend = "xsel"

            [activation]
            enabled = true
            target_window = "Remote Viewer"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = load_config(temp_file.path()).unwrap();

        assert_eq!(config.network.first_port, 12000);
        assert_eq!(config.network.ports_tried, 4);
        assert_eq!(config.run.iterations, 50);
        assert_eq!(config.run.payload_len, 2048);
        assert_eq!(config.clipboard.backend, "xsel");
        assert!(config.activation.enabled);
        assert_eq!(config.activation.target_window, "Remote Viewer");
        // untouched sections keep their defaults
        assert_eq!(config.stabilize.max_attempts, 30);
        assert_eq!(config.activation.console_post_activate_ms, 100);
    }

    #[test]
    fn test_load_config_empty_file_is_defaults() {
        let temp_file = NamedTempFile::new().unwrap();

        let config = load_config(temp_file.path()).unwrap();

        assert_eq!(config, HarnessConfig::default());
    }

    #[test]
    fn test_load_config_rejects_wrong_types() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[run]\niterations = \"many\"\n")
            .unwrap();

        let err = load_config(temp_file.path()).unwrap_err();

        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_load_config_returns_io_error_on_file_not_found() {
        let path = PathBuf::from("/this/path/does/not/exist/config.toml");

        let err = load_config(&path).unwrap_err();

        assert!(
            err.to_string().contains("Failed to read config file"),
            "Expected IO error message, got: {}",
            err
        );
    }

    #[test]
    fn test_load_effective_requires_explicit_file() {
        let path = PathBuf::from("/this/path/does/not/exist/config.toml");
        assert!(load_effective(Some(&path)).is_err());
    }

    #[test]
    fn test_default_config_path_ends_with_app_file() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("clipcheck/config.toml"));
        }
    }
}
