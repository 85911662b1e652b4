//! Mock implementations of service traits for testing

use super::traits::{CatalogClient, ProcessRunner};
use crate::client::{DownloadStream, HostUpdateCandidate, PluginUpdateCandidate, UpdateCandidate};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use updatekit_core::{Manifest, Platform, SemanticVersion, UpdateError, UpdateResult};

/// Mock catalog client for testing
///
/// Serves configured candidates and in-memory artifact payloads instead
/// of talking to a server, and records which downloads were requested.
#[derive(Clone, Default)]
pub struct MockCatalogClient {
    plugins: Arc<Mutex<Vec<PluginUpdateCandidate>>>,
    host: Arc<Mutex<Option<HostUpdateCandidate>>>,
    plugin_payloads: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    host_payload: Arc<Mutex<Option<Vec<u8>>>>,
    failing_downloads: Arc<Mutex<HashSet<String>>>,
    download_requests: Arc<Mutex<Vec<String>>>,
}

impl MockCatalogClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve a plugin candidate whose archive download yields `payload`.
    pub fn add_plugin(&self, candidate: PluginUpdateCandidate, payload: Vec<u8>) {
        self.plugin_payloads
            .lock()
            .unwrap()
            .insert(candidate.manifest.name.clone(), payload);
        self.plugins.lock().unwrap().push(candidate);
    }

    /// Serve a host candidate whose installer download yields `payload`.
    pub fn set_host(&self, candidate: HostUpdateCandidate, payload: Vec<u8>) {
        *self.host.lock().unwrap() = Some(candidate);
        *self.host_payload.lock().unwrap() = Some(payload);
    }

    /// Make the archive download for `name` fail with a download error.
    pub fn fail_download(&self, name: &str) {
        self.failing_downloads
            .lock()
            .unwrap()
            .insert(name.to_string());
    }

    /// Resources the mock served download streams for, in request order.
    pub fn download_requests(&self) -> Vec<String> {
        self.download_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogClient for MockCatalogClient {
    async fn latest_plugins(
        &self,
        _installed: &[Manifest],
        _host_version: &SemanticVersion,
    ) -> UpdateResult<Vec<PluginUpdateCandidate>> {
        Ok(self.plugins.lock().unwrap().clone())
    }

    async fn latest_host(
        &self,
        _host_version: &SemanticVersion,
        _platform: Platform,
    ) -> UpdateResult<Option<HostUpdateCandidate>> {
        Ok(self.host.lock().unwrap().clone())
    }

    async fn download_plugin(
        &self,
        name: &str,
        version: &SemanticVersion,
    ) -> UpdateResult<DownloadStream> {
        let resource = format!("api/plugin/{}/{}/download", name, version);
        self.download_requests
            .lock()
            .unwrap()
            .push(resource.clone());

        if self.failing_downloads.lock().unwrap().contains(name) {
            return Err(UpdateError::Download {
                status: 500,
                resource,
            });
        }

        let payload = self
            .plugin_payloads
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| UpdateError::Download {
                status: 404,
                resource: resource.clone(),
            })?;

        // deliver in two chunks to exercise the streaming path
        let middle = payload.len() / 2;
        let chunks = vec![payload[..middle].to_vec(), payload[middle..].to_vec()];
        Ok(DownloadStream::from_chunks(resource, chunks))
    }

    async fn download_host(
        &self,
        version: &SemanticVersion,
        platform: Platform,
    ) -> UpdateResult<DownloadStream> {
        let resource = format!("api/ime/{}/{}/download", version, platform);
        self.download_requests
            .lock()
            .unwrap()
            .push(resource.clone());

        let payload = self
            .host_payload
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| UpdateError::Download {
                status: 404,
                resource: resource.clone(),
            })?;
        Ok(DownloadStream::from_chunks(resource, vec![payload]))
    }

    async fn check_for_update(
        &self,
        installed: &[Manifest],
        host_version: &SemanticVersion,
        platform: Platform,
    ) -> UpdateResult<Vec<UpdateCandidate>> {
        let mut candidates: Vec<UpdateCandidate> = self
            .latest_plugins(installed, host_version)
            .await?
            .into_iter()
            .map(UpdateCandidate::Plugin)
            .collect();
        if let Some(host) = self.latest_host(host_version, platform).await? {
            candidates.push(UpdateCandidate::Host(host));
        }
        Ok(candidates)
    }
}

/// Mock process runner for testing
///
/// Records the installers it was asked to launch instead of spawning
/// anything.
#[derive(Clone, Default)]
pub struct MockProcessRunner {
    launched: Arc<Mutex<Vec<PathBuf>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every launch attempt fail.
    pub fn fail_launches(&self) {
        *self.fail.lock().unwrap() = true;
    }

    pub fn launched(&self) -> Vec<PathBuf> {
        self.launched.lock().unwrap().clone()
    }
}

impl ProcessRunner for MockProcessRunner {
    fn launch_installer(&self, installer: &Path) -> UpdateResult<()> {
        if *self.fail.lock().unwrap() {
            return Err(UpdateError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "launch refused",
            )));
        }
        self.launched.lock().unwrap().push(installer.to_path_buf());
        Ok(())
    }
}
