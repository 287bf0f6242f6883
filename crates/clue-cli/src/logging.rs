use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

pub struct LoggingGuard {
    _guard: WorkerGuard,
    pub telemetry_path: PathBuf,
}

fn filter_for(logging: &LoggingConfig) -> EnvFilter {
    let level = logging.level().unwrap_or(Level::WARN);
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

/// Structured runs append JSON lines to `<data_dir>/telemetry.jsonl`; otherwise
/// human-readable events go to stderr.
pub fn init_logging(logging: &LoggingConfig, data_dir: &Path) -> Result<Option<LoggingGuard>> {
    let filter = filter_for(logging);

    if !logging.enable_structured {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
        return Ok(None);
    }

    fs::create_dir_all(data_dir)
        .with_context(|| format!("creating telemetry directory at {}", data_dir.display()))?;

    let telemetry_path = data_dir.join("telemetry.jsonl");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&telemetry_path)
        .with_context(|| format!("opening telemetry file at {}", telemetry_path.display()))?;

    let (writer, guard) = non_blocking::NonBlockingBuilder::default()
        .lossy(false)
        .finish(file);

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .json()
        .with_current_span(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer)
        .finish();

    // A global subscriber may already be installed (e.g. in tests).
    let _ = tracing::subscriber::set_global_default(subscriber);

    Ok(Some(LoggingGuard {
        _guard: guard,
        telemetry_path,
    }))
}
