use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use updatekit_core::core::path::{config_file, ensure_dir, update_home};
use updatekit_core::{UpdateError, UpdateResult};

/// Default update-server base address, used until the consumer
/// configures its own. Additional addresses can be appended; the last
/// entry wins.
fn default_server_addresses() -> Vec<String> {
    vec!["https://updates.updatekit.dev".to_string()]
}

fn default_max_concurrent_updates() -> usize {
    4
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// Update-server base addresses. The last entry is the one used, so
    /// appending an address overrides the default without losing it.
    #[serde(default = "default_server_addresses")]
    pub update_server_addresses: Vec<String>,

    /// Root of the on-disk layout (defaults to the platform-specific
    /// application-data directory)
    ///
    /// Default locations:
    /// - Windows: %APPDATA%\updatekit
    /// - Linux: ~/.local/share/updatekit
    /// - macOS: ~/Library/Application Support/updatekit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,

    /// How many plugin update transactions may run concurrently
    #[serde(default = "default_max_concurrent_updates")]
    pub max_concurrent_updates: usize,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            update_server_addresses: default_server_addresses(),
            data_dir: None,
            max_concurrent_updates: default_max_concurrent_updates(),
        }
    }
}

impl UpdateConfig {
    /// Load config from the platform-specific config directory, creating
    /// the default if it doesn't exist
    ///
    /// Config locations:
    /// - Windows: %APPDATA%\updatekit\config.yaml
    /// - Linux: ~/.config/updatekit/config.yaml
    /// - macOS: ~/Library/Application Support/updatekit/config.yaml
    pub fn load() -> UpdateResult<Self> {
        let config_path = config_file()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = fs::read_to_string(&config_path)?;
        let config: UpdateConfig = serde_yaml::from_str(&content)
            .map_err(|e| UpdateError::Config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Save config to the platform-specific config directory
    pub fn save(&self) -> UpdateResult<()> {
        let config_path = config_file()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| UpdateError::Path("Invalid config path".to_string()))?;

        ensure_dir(config_dir)?;

        let content = serde_yaml::to_string(self)
            .map_err(|e| UpdateError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)?;
        Ok(())
    }

    /// The update-server address in effect (last configured entry).
    pub fn server_address(&self) -> &str {
        self.update_server_addresses
            .last()
            .map(String::as_str)
            .unwrap_or("https://updates.updatekit.dev")
    }

    /// Get the layout root path
    pub fn get_data_dir(&self) -> UpdateResult<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            Ok(PathBuf::from(dir))
        } else {
            update_home()
        }
    }
}
