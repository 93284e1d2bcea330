//! Process wiring: configuration, logging and role dispatch.

pub mod config;
pub mod run;
pub mod tracing;

pub use config::{default_config_path, load_config, load_effective};
pub use run::{exit_status, run, run_with_clipboard, RunOutcome};
pub use self::tracing::init_tracing_subscriber;
