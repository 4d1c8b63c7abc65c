mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, LoggingConfig, SeedConfig};
pub use database::Database;

use std::path::PathBuf;

/// Returns `~/.config/habitual[-dev]/` based on HABITUAL_ENV, creating it if
/// needed. HABITUAL_DATA_DIR overrides the location outright.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("HABITUAL_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("HABITUAL_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("habitual-dev")
            } else {
                base_dir.join("habitual")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
