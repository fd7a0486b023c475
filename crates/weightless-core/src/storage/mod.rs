mod database;
mod settings;
mod store;

pub use database::Database;
pub use settings::{AudioSettings, LogSettings, SessionSettings, Settings};
pub use store::{ConfigStore, KvConfigStore, MemoryConfigStore, CONFIG_KEY};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/weightless[-dev]/` based on WEIGHTLESS_ENV.
///
/// Set WEIGHTLESS_ENV=dev to use the development data directory, or
/// WEIGHTLESS_HOME to use an explicit directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("WEIGHTLESS_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("WEIGHTLESS_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("weightless-dev")
            } else {
                base_dir.join("weightless")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
