//! Log output. The terminal belongs to the UI, so events go to a file.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Env var that overrides `logging.level`.
pub const LOG_ENV: &str = "CADENZA_LOG";

/// Install the global subscriber writing to `file`.
pub fn init(settings: &LoggingSettings, file: &Path) -> std::io::Result<()> {
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent)?;
    }
    let sink = OpenOptions::new().create(true).append(true).open(file)?;

    // A second init (e.g. in tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(settings))
        .with_writer(Mutex::new(sink))
        .with_ansi(false)
        .with_target(true)
        .try_init();
    Ok(())
}

fn filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
