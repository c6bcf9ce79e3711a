mod config;
pub mod json_store;

pub use config::{Config, DaemonConfig, GenerationConfig, LogConfig, NotificationsConfig};
pub use json_store::JsonStore;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `GETODONE_HOME` wins when set. Otherwise `~/.config/getodone[-dev]/`
/// based on `GETODONE_ENV` (set `GETODONE_ENV=dev` for a development copy).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("GETODONE_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("GETODONE_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("getodone-dev")
            } else {
                base_dir.join("getodone")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(ConfigError::DataDir)?;
    Ok(dir)
}
