use super::load::{default_config_path, default_data_dir, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|p| p.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_cadenza_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("CADENZA_CONFIG_PATH", "/tmp/cadenza-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/cadenza-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("cadenza")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("cadenza")
            .join("config.toml")
    );
}

#[test]
fn default_data_dir_follows_xdg_data_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_DATA_HOME", "/tmp/xdg-data");
    assert_eq!(
        default_data_dir().unwrap(),
        std::path::PathBuf::from("/tmp/xdg-data").join("cadenza")
    );

    let _g2 = EnvGuard::remove("XDG_DATA_HOME");
    let _g3 = EnvGuard::set("HOME", "/tmp/home-dir");
    assert_eq!(
        default_data_dir().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir/.local/share/cadenza")
    );
}

#[test]
fn defaults_match_preview_playback() {
    let s = Settings::default();
    assert_eq!(s.playback.progress_interval_ms, 500);
    assert_eq!(s.playback.preview_cap_ms, 30_000);
    assert!(s.playback.auto_advance);
    assert_eq!(s.handoff.ack_timeout_ms, 2_000);
    assert_eq!(s.handoff.tick_interval_ms, 1_000);
    assert_eq!(s.catalog.base_url, "https://api.deezer.com");
    assert!(s.validate().is_ok());
}

#[test]
fn partial_document_keeps_defaults_for_missing_keys() {
    let s: Settings = toml::from_str(
        r#"
[handoff]
ack_timeout_ms = 750

[ui]
now_playing_time_fields = ["remaining"]
"#,
    )
    .unwrap();

    assert_eq!(s.handoff.ack_timeout_ms, 750);
    assert_eq!(s.handoff.tick_interval_ms, 1_000);
    assert_eq!(s.ui.now_playing_time_fields, vec![TimeField::Remaining]);
    assert_eq!(s.ui.now_playing_time_separator, " / ");
    assert_eq!(s.playback.preview_cap_ms, 30_000);
}

#[test]
fn validate_rejects_zero_intervals() {
    let mut s = Settings::default();
    s.playback.progress_interval_ms = 0;
    assert_eq!(
        s.validate().unwrap_err(),
        "playback.progress_interval_ms must be >= 1"
    );

    let mut s = Settings::default();
    s.handoff.ack_timeout_ms = 0;
    assert!(s.validate().unwrap_err().contains("handoff.ack_timeout_ms"));

    let mut s = Settings::default();
    s.catalog.base_url = "  ".to_string();
    assert!(s.validate().is_err());
}

#[test]
fn storage_paths_derive_from_data_dir() {
    let mut s = Settings::default();
    s.storage.data_dir = Some("/var/lib/cadenza".into());
    assert_eq!(
        s.downloads_dir(),
        std::path::PathBuf::from("/var/lib/cadenza/downloads")
    );
    assert_eq!(
        s.log_file(),
        std::path::PathBuf::from("/var/lib/cadenza/cadenza.log")
    );

    s.storage.downloads_dir = Some("/music".into());
    s.logging.file = Some("/tmp/c.log".into());
    assert_eq!(s.downloads_dir(), std::path::PathBuf::from("/music"));
    assert_eq!(s.log_file(), std::path::PathBuf::from("/tmp/c.log"));
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[catalog]
base_url = "http://localhost:9000"
timeout_ms = 1500

[playback]
progress_interval_ms = 250
preview_cap_ms = 15000
auto_advance = false

[handoff]
ack_timeout_ms = 500
tick_interval_ms = 200

[storage]
data_dir = "/tmp/cadenza-data"

[ui]
header_text = "hello"
now_playing_time_fields = ["elapsed", "remaining"]
now_playing_time_separator = " | "

[logging]
level = "cadenza=debug"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("CADENZA_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("CADENZA__HANDOFF__ACK_TIMEOUT_MS");

    let s = Settings::load().unwrap();
    assert_eq!(s.catalog.base_url, "http://localhost:9000");
    assert_eq!(s.catalog.timeout_ms, 1500);
    assert_eq!(s.playback.progress_interval_ms, 250);
    assert_eq!(s.playback.preview_cap_ms, 15_000);
    assert!(!s.playback.auto_advance);
    assert_eq!(s.handoff.ack_timeout_ms, 500);
    assert_eq!(s.handoff.tick_interval_ms, 200);
    assert_eq!(
        s.storage.data_dir,
        Some(std::path::PathBuf::from("/tmp/cadenza-data"))
    );
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(
        s.ui.now_playing_time_fields,
        vec![TimeField::Elapsed, TimeField::Remaining]
    );
    assert_eq!(s.ui.now_playing_time_separator, " | ");
    assert_eq!(s.logging.level, "cadenza=debug");
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[handoff]
ack_timeout_ms = 2000
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("CADENZA_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("CADENZA__HANDOFF__ACK_TIMEOUT_MS", "300");

    let s = Settings::load().unwrap();
    assert_eq!(s.handoff.ack_timeout_ms, 300);
}
