use crate::core::error::{UpdateError, UpdateResult};
use crate::core::version::SemanticVersion;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Identity of one installed plugin: its name and the version currently
/// on disk. Manifests are stored next to the plugin's binaries as a JSON
/// file with PascalCase keys, the same shape the update server expects in
/// query bodies. Identity is the `name`; at most one version per name is
/// installed at any time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Manifest {
    pub name: String,
    pub version: SemanticVersion,
}

impl Manifest {
    pub fn new(name: impl Into<String>, version: SemanticVersion) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }

    /// Read a manifest from a JSON file on disk.
    pub fn load(path: &Path) -> UpdateResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a manifest from its JSON content. Unknown keys are ignored
    /// so manifests may carry extra metadata the update service does not
    /// use.
    pub fn parse(content: &str) -> UpdateResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| UpdateError::Protocol(format!("Invalid manifest: {}", e)))
    }
}
