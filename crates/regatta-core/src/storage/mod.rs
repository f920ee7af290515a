mod config;
pub mod database;

pub use config::{AudioConfig, Config, DefaultsConfig, GhostConfig, TimerConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::Result;

/// Returns the data directory, creating it if needed.
///
/// `REGATTA_DATA_DIR` wins when set. Otherwise `~/.config/regatta`, or
/// `~/.config/regatta-dev` when `REGATTA_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("REGATTA_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("REGATTA_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("regatta-dev")
            } else {
                base_dir.join("regatta")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
