//! Wire types for the update-server API

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use updatekit_core::{Manifest, Platform, SemanticVersion};

/// Logical name the host application goes by in the update catalog and
/// in installer file names.
pub const HOST_KEY: &str = "ime";

/// One available newer version of one plugin, as reported by the
/// consolidate-plugins query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PluginUpdateCandidate {
    pub manifest: Manifest,
    /// Server-relative reference to the downloadable archive.
    pub download_reference: String,
}

/// The newest available host-application version and, per platform,
/// where to fetch its installer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostUpdateCandidate {
    pub version: SemanticVersion,
    pub platform_downloads: HashMap<Platform, String>,
}

/// A server-reported update, either for a plugin or for the host
/// application. The two shapes share nothing beyond "has a version", so
/// they are a sum type rather than a common trait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateCandidate {
    Plugin(PluginUpdateCandidate),
    Host(HostUpdateCandidate),
}

impl UpdateCandidate {
    /// Catalog name of the updatable thing (plugin name, or [`HOST_KEY`]).
    pub fn name(&self) -> &str {
        match self {
            UpdateCandidate::Plugin(p) => &p.manifest.name,
            UpdateCandidate::Host(_) => HOST_KEY,
        }
    }

    pub fn version(&self) -> &SemanticVersion {
        match self {
            UpdateCandidate::Plugin(p) => &p.manifest.version,
            UpdateCandidate::Host(h) => &h.version,
        }
    }
}

/// Body of the consolidate-plugins query: what is installed locally plus
/// the host version the plugins must stay compatible with.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct PluginQuery<'a> {
    pub manifests: &'a [Manifest],
    pub host_version: SemanticVersion,
}

/// Body of the host-update query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct HostQuery {
    pub host_version: SemanticVersion,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_candidate_deserializes_from_pascal_case() {
        let json = r#"{
            "Manifest": {"Name": "Plugin0", "Version": "0.2.0.0"},
            "DownloadReference": "api/plugin/Plugin0/0.2.0.0/download"
        }"#;
        let candidate: PluginUpdateCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.manifest.name, "Plugin0");
        assert_eq!(candidate.manifest.version, SemanticVersion::new(0, 2, 0, 0));
    }

    #[test]
    fn test_host_candidate_platform_map() {
        let json = r#"{
            "Version": "1.3.0.0",
            "PlatformDownloads": {
                "x64": "api/ime/1.3.0.0/x64/download",
                "x86": "api/ime/1.3.0.0/x86/download"
            }
        }"#;
        let candidate: HostUpdateCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.platform_downloads.len(), 2);
        assert!(candidate.platform_downloads.contains_key(&Platform::X64));
    }

    #[test]
    fn test_candidate_accessors() {
        let plugin = UpdateCandidate::Plugin(PluginUpdateCandidate {
            manifest: Manifest::new("Plugin0", SemanticVersion::new(0, 2, 0, 0)),
            download_reference: "ref".to_string(),
        });
        assert_eq!(plugin.name(), "Plugin0");
        assert_eq!(*plugin.version(), SemanticVersion::new(0, 2, 0, 0));

        let host = UpdateCandidate::Host(HostUpdateCandidate {
            version: SemanticVersion::new(1, 3, 0, 0),
            platform_downloads: HashMap::new(),
        });
        assert_eq!(host.name(), HOST_KEY);
    }

    #[test]
    fn test_plugin_query_body_shape() {
        let manifests = vec![Manifest::new("Plugin0", SemanticVersion::new(0, 1, 0, 0))];
        let query = PluginQuery {
            manifests: &manifests,
            host_version: SemanticVersion::new(1, 2, 0, 0),
        };
        let json = serde_json::to_string(&query).unwrap();
        assert!(json.contains("\"Manifests\""));
        assert!(json.contains("\"HostVersion\":\"1.2.0.0\""));
    }
}
