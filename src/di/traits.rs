//! Trait definitions for dependency injection

use crate::client::{DownloadStream, HostUpdateCandidate, PluginUpdateCandidate, UpdateCandidate};
use async_trait::async_trait;
use std::path::Path;
use updatekit_core::{Manifest, Platform, SemanticVersion, UpdateResult};

/// Trait for update-catalog access
///
/// Discovery queries and artifact downloads against the update server.
/// Implementations should be thread-safe (Send + Sync).
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// The catalog's newest compatible version for every installed
    /// plugin name the server knows, newer than installed or not.
    async fn latest_plugins(
        &self,
        installed: &[Manifest],
        host_version: &SemanticVersion,
    ) -> UpdateResult<Vec<PluginUpdateCandidate>>;

    /// The newest available host-application version, or `None` when the
    /// server reports no update.
    async fn latest_host(
        &self,
        host_version: &SemanticVersion,
        platform: Platform,
    ) -> UpdateResult<Option<HostUpdateCandidate>>;

    /// Open a byte stream over one plugin archive.
    async fn download_plugin(
        &self,
        name: &str,
        version: &SemanticVersion,
    ) -> UpdateResult<DownloadStream>;

    /// Open a byte stream over the host installer package.
    async fn download_host(
        &self,
        version: &SemanticVersion,
        platform: Platform,
    ) -> UpdateResult<DownloadStream>;

    /// Both discovery queries, results unioned without deduplication.
    async fn check_for_update(
        &self,
        installed: &[Manifest],
        host_version: &SemanticVersion,
        platform: Platform,
    ) -> UpdateResult<Vec<UpdateCandidate>>;
}

/// Trait for handing a downloaded host installer over to the operating
/// system.
///
/// Launching happens through the platform's standard elevated
/// installation mechanism; after a successful hand-off the running
/// process is expected to terminate itself, which is the caller's
/// responsibility, not this trait's.
pub trait ProcessRunner: Send + Sync {
    fn launch_installer(&self, installer: &Path) -> UpdateResult<()>;
}
