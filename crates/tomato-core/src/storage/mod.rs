mod config;
pub mod database;
pub mod ledger;

pub use config::{Config, NotificationsConfig, TimerConfig, UiConfig, WakeLockConfig};
pub use database::Database;
pub use ledger::{DailyLedger, DailyRecord, KvStore, MemoryStore, LEDGER_KEY};

use std::path::PathBuf;

/// Returns the data directory, creating it if needed.
///
/// `TOMATO_HOME` overrides the location outright. Otherwise this is
/// `~/.config/tomato-timer[-dev]/` based on TOMATO_ENV.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("TOMATO_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("TOMATO_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("tomato-timer-dev")
            } else {
                base_dir.join("tomato-timer")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
