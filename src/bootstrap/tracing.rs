//! Tracing configuration.
//!
//! Stdout always gets a fmt layer. A second, non-blocking file layer is
//! added when a log directory is configured. `RUST_LOG` overrides the
//! verbosity picked from `-v`.

use std::{
    fs, io,
    path::Path,
    sync::OnceLock,
};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, fmt::writer::BoxMakeWriter, prelude::*, registry};

const LOG_FILE: &str = "clipcheck.log";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Default filter directives for a `-v` count.
///
/// 0 keeps our crates at info, 1 at debug, 2 or more at trace. Everything
/// else stays at warn.
fn build_filter_directives(verbosity: u8) -> Vec<String> {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let mut directives = vec!["warn".to_string()];
    directives.extend(
        ["clipcheck", "clipcheck_lib", "cc_core", "cc_app", "cc_platform"]
            .iter()
            .map(|target| format!("{target}={level}")),
    );
    directives
}

/// Register the global subscriber.
///
/// # Errors
///
/// Returns `Err` if a subscriber is already registered or the log
/// directory cannot be created.
pub fn init_tracing_subscriber(verbosity: u8, log_dir: Option<&Path>) -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(build_filter_directives(verbosity).join(","))
    });

    let stdout_writer: BoxMakeWriter = BoxMakeWriter::new(io::stdout);
    let file_writer = match log_dir {
        Some(dir) => Some(build_file_writer(dir)?),
        None => None,
    };

    // "2025-01-15 10:30:45.123  INFO clipcheck_lib::bootstrap::run: run.rs:42: message"
    let stdout_layer = fmt::layer()
        .with_timer(fmt::time::ChronoUtc::new(TIMESTAMP_FORMAT.to_string()))
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_ansi(cfg!(not(test)))
        .with_writer(stdout_writer);

    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .with_timer(fmt::time::ChronoUtc::new(TIMESTAMP_FORMAT.to_string()))
            .with_level(true)
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_ansi(false)
            .with_writer(writer)
    });

    let subscriber = registry().with(env_filter).with(stdout_layer);
    if let Some(layer) = file_layer {
        subscriber.with(layer).try_init()?;
    } else {
        subscriber.try_init()?;
    }

    Ok(())
}

fn build_file_writer(dir: &Path) -> anyhow::Result<NonBlocking> {
    fs::create_dir_all(dir)?;

    let file_appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    LOG_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Tracing log guard already initialized"))?;

    Ok(non_blocking)
}
