use crate::core::error::{UpdateError, UpdateResult};
use std::path::{Path, PathBuf};

/// Get the UpdateKit data directory, the root under which installed
/// plugins, backups and download caches live.
///
/// Platform-specific locations:
/// - Windows: %APPDATA%\updatekit
/// - Linux: ~/.local/share/updatekit
/// - macOS: ~/Library/Application Support/updatekit
pub fn update_home() -> UpdateResult<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| UpdateError::Path("Could not determine data directory".to_string()))?;
    Ok(data_dir.join("updatekit"))
}

/// Get the config file path
///
/// Platform-specific locations:
/// - Windows: %APPDATA%\updatekit\config.yaml
/// - Linux: ~/.config/updatekit/config.yaml
/// - macOS: ~/Library/Application Support/updatekit/config.yaml
pub fn config_file() -> UpdateResult<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| UpdateError::Path("Could not determine config directory".to_string()))?;
    Ok(config_dir.join("updatekit").join("config.yaml"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> UpdateResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
