//! Update catalog client
//!
//! Talks to the update server: cheap discovery round trips ("what is
//! newer than what I have") separated from the potentially large binary
//! transfers, so callers can present a fast what's-new list before
//! committing to downloads.

pub mod types;

pub use types::{
    HostUpdateCandidate, PluginUpdateCandidate, UpdateCandidate, HOST_KEY,
};

use crate::di::traits::CatalogClient;
use async_trait::async_trait;
use reqwest::{header, Client as HttpClient, StatusCode};
use std::time::Duration;
use tracing::debug;
use types::{HostQuery, PluginQuery};
use updatekit_core::{Manifest, Platform, SemanticVersion, UpdateError, UpdateResult};

/// A chunked artifact download. Bytes are pulled off the wire as they
/// arrive; the archive is never buffered fully in memory.
pub struct DownloadStream {
    resource: String,
    source: StreamSource,
}

enum StreamSource {
    Http(reqwest::Response),
    Memory(std::vec::IntoIter<Vec<u8>>),
}

impl DownloadStream {
    fn from_response(resource: String, response: reqwest::Response) -> Self {
        Self {
            resource,
            source: StreamSource::Http(response),
        }
    }

    /// Build a stream over in-memory chunks. Used by test doubles.
    pub fn from_chunks(resource: impl Into<String>, chunks: Vec<Vec<u8>>) -> Self {
        Self {
            resource: resource.into(),
            source: StreamSource::Memory(chunks.into_iter()),
        }
    }

    /// The server-relative resource path this stream was opened against.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The next chunk of the artifact, or `None` once the stream is
    /// exhausted.
    pub async fn next_chunk(&mut self) -> UpdateResult<Option<Vec<u8>>> {
        match &mut self.source {
            StreamSource::Http(response) => Ok(response.chunk().await?.map(|b| b.to_vec())),
            StreamSource::Memory(chunks) => Ok(chunks.next()),
        }
    }
}

/// Client for the update-server API
pub struct UpdateServerClient {
    http_client: HttpClient,
    base_address: String,
}

impl UpdateServerClient {
    /// Create a new client against the given base server address.
    pub fn new(base_address: &str) -> UpdateResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static("updatekit"));
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let http_client = HttpClient::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| UpdateError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_address: base_address.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_address, path)
    }

    /// Query the newest compatible version of every installed plugin.
    ///
    /// The server answers for each plugin name it knows among those
    /// queried, even when its newest version is not newer than the
    /// installed one; filtering for strictly-newer is the orchestrator's
    /// job. Unknown plugin names are silently omitted.
    pub async fn latest_plugins(
        &self,
        installed: &[Manifest],
        host_version: &SemanticVersion,
    ) -> UpdateResult<Vec<PluginUpdateCandidate>> {
        let url = self.endpoint("api/plugin");
        debug!(url = %url, manifests = installed.len(), "querying plugin updates");

        let query = PluginQuery {
            manifests: installed,
            host_version: *host_version,
        };

        let response = self
            .http_client
            .post(&url)
            .json(&query)
            .send()
            .await?
            .error_for_status()?;

        response
            .json::<Vec<PluginUpdateCandidate>>()
            .await
            .map_err(|e| UpdateError::Protocol(format!("Unexpected plugin update response: {}", e)))
    }

    /// Query the newest available host-application version.
    ///
    /// Returns `None` when the server reports no update (HTTP 204 or an
    /// empty body). When an update exists, the candidate carries a
    /// download reference for at least the requested platform.
    pub async fn latest_host(
        &self,
        host_version: &SemanticVersion,
        platform: Platform,
    ) -> UpdateResult<Option<HostUpdateCandidate>> {
        let url = self.endpoint("api/ime");
        debug!(url = %url, %platform, "querying host update");

        let query = HostQuery {
            host_version: *host_version,
        };

        let response = self
            .http_client
            .post(&url)
            .json(&query)
            .send()
            .await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let response = response.error_for_status()?;
        let body = response.text().await?;

        if body.trim().is_empty() || body.trim() == "null" {
            return Ok(None);
        }

        let candidate: HostUpdateCandidate = serde_json::from_str(&body)
            .map_err(|e| UpdateError::Protocol(format!("Unexpected host update response: {}", e)))?;

        if !candidate.platform_downloads.contains_key(&platform) {
            return Err(UpdateError::Protocol(format!(
                "Host update {} carries no download for platform {}",
                candidate.version, platform
            )));
        }

        Ok(Some(candidate))
    }

    /// Open a download stream for one plugin archive.
    pub async fn download_plugin(
        &self,
        name: &str,
        version: &SemanticVersion,
    ) -> UpdateResult<DownloadStream> {
        let resource = format!(
            "api/plugin/{}/{}/download",
            urlencoding::encode(name),
            version
        );
        self.download(resource).await
    }

    /// Open a download stream for the host installer package.
    pub async fn download_host(
        &self,
        version: &SemanticVersion,
        platform: Platform,
    ) -> UpdateResult<DownloadStream> {
        let resource = format!("api/ime/{}/{}/download", version, platform);
        self.download(resource).await
    }

    async fn download(&self, resource: String) -> UpdateResult<DownloadStream> {
        let url = self.endpoint(&resource);
        debug!(url = %url, "opening artifact download");

        let response = self.http_client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(UpdateError::Download {
                status: response.status().as_u16(),
                resource,
            });
        }

        Ok(DownloadStream::from_response(resource, response))
    }

    /// Run both discovery queries and union their results.
    ///
    /// The union is not deduplicated: the two queries execute
    /// independently and their counts simply add, with host and plugin
    /// candidates reported together.
    pub async fn check_for_update(
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

#[async_trait]
impl CatalogClient for UpdateServerClient {
    async fn latest_plugins(
        &self,
        installed: &[Manifest],
        host_version: &SemanticVersion,
    ) -> UpdateResult<Vec<PluginUpdateCandidate>> {
        Self::latest_plugins(self, installed, host_version).await
    }

    async fn latest_host(
        &self,
        host_version: &SemanticVersion,
        platform: Platform,
    ) -> UpdateResult<Option<HostUpdateCandidate>> {
        Self::latest_host(self, host_version, platform).await
    }

    async fn download_plugin(
        &self,
        name: &str,
        version: &SemanticVersion,
    ) -> UpdateResult<DownloadStream> {
        Self::download_plugin(self, name, version).await
    }

    async fn download_host(
        &self,
        version: &SemanticVersion,
        platform: Platform,
    ) -> UpdateResult<DownloadStream> {
        Self::download_host(self, version, platform).await
    }

    async fn check_for_update(
        &self,
        installed: &[Manifest],
        host_version: &SemanticVersion,
        platform: Platform,
    ) -> UpdateResult<Vec<UpdateCandidate>> {
        Self::check_for_update(self, installed, host_version, platform).await
    }
}
