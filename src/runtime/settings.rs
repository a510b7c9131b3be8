use ::config::ConfigError;

use crate::config::Settings;

/// Settings to run with, plus why the configured ones were rejected.
///
/// Configuration is optional: a missing, unreadable or invalid file never
/// keeps the app from starting.
pub fn load_settings() -> (Settings, Option<String>) {
    settings_or_default(Settings::load())
}

fn settings_or_default(loaded: Result<Settings, ConfigError>) -> (Settings, Option<String>) {
    match loaded {
        Ok(settings) => match settings.validate() {
            Ok(()) => (settings, None),
            Err(msg) => (Settings::default(), Some(format!("invalid config: {msg}"))),
        },
        Err(e) => (Settings::default(), Some(format!("failed to load config: {e}"))),
    }
}
