//! Update orchestration
//!
//! `Updater` composes the catalog client and the artifact store into the
//! end-to-end workflow: check → download → backup → install →
//! cleanup-or-restore. Each plugin candidate runs as its own transaction
//! over its own disjoint directories, so candidates are processed
//! concurrently and one failure never aborts the others.

pub mod process;

pub use process::SystemProcessRunner;

use crate::client::{HostUpdateCandidate, PluginUpdateCandidate, UpdateCandidate};
use crate::di::traits::{CatalogClient, ProcessRunner};
use crate::filesystem::{host_installer_file_name, UpdateFileSystem};
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use updatekit_core::{Manifest, Platform, SemanticVersion, UpdateError, UpdateResult};

/// Outcome of one plugin's update transaction.
#[derive(Debug)]
pub enum PluginUpdateOutcome {
    /// The new version is installed and transient state reclaimed.
    Updated(SemanticVersion),
    /// The candidate is not strictly newer than what is installed;
    /// nothing was downloaded or touched.
    AlreadyCurrent,
    /// Cancelled before the backup phase; the partial download was
    /// reclaimed.
    Cancelled,
    /// The transaction failed. When the error is
    /// [`UpdateError::Inconsistent`] the restore attempt failed too and
    /// the installation can no longer be trusted.
    Failed(UpdateError),
}

impl PluginUpdateOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, PluginUpdateOutcome::Updated(_))
    }
}

/// Per-plugin result of an update run.
#[derive(Debug)]
pub struct PluginUpdateReport {
    pub name: String,
    pub outcome: PluginUpdateOutcome,
}

/// Outcome of a host-application update attempt.
#[derive(Debug)]
pub enum HostUpdateOutcome {
    /// The installer was launched; the caller must now terminate the
    /// running process so the installer can replace it.
    HandedOff(PathBuf),
    /// The reported host version is not strictly newer than the running
    /// one.
    AlreadyCurrent,
    /// Cancelled mid-download; the partial installer was reclaimed.
    Cancelled,
}

/// Result of a full check-and-update run.
#[derive(Debug)]
pub struct UpdateRun {
    pub plugin_reports: Vec<PluginUpdateReport>,
    /// A pending host update, reported back rather than applied: the
    /// hand-off terminates the process, so the caller decides when.
    pub host_candidate: Option<HostUpdateCandidate>,
}

enum Download {
    Complete,
    Cancelled,
}

/// Sequences discovery, download and installation into one safe
/// (best-effort) transaction per plugin or host.
pub struct Updater {
    client: Arc<dyn CatalogClient>,
    filesystem: UpdateFileSystem,
    process_runner: Arc<dyn ProcessRunner>,
    max_concurrent: usize,
}

impl Updater {
    /// Create a new updater with injected dependencies.
    pub fn new(
        client: Arc<dyn CatalogClient>,
        filesystem: UpdateFileSystem,
        process_runner: Arc<dyn ProcessRunner>,
        max_concurrent: Option<usize>,
    ) -> Self {
        Self {
            client,
            filesystem,
            process_runner,
            max_concurrent: max_concurrent.unwrap_or(4), // Default to 4 concurrent plugin updates
        }
    }

    /// Read the installed manifests and ask the catalog what is newer.
    pub async fn check_for_updates(
        &self,
        host_version: &SemanticVersion,
        platform: Platform,
    ) -> UpdateResult<Vec<UpdateCandidate>> {
        let installed = self.filesystem.installed_manifests()?;
        self.client
            .check_for_update(&installed, host_version, platform)
            .await
    }

    /// Check the catalog and apply every eligible plugin update.
    ///
    /// A pending host update is returned, not applied; launching the
    /// installer terminates the host process, so that step stays with
    /// the caller (see [`Updater::update_host`]).
    pub async fn update_all(
        &self,
        host_version: &SemanticVersion,
        platform: Platform,
        cancel: &CancellationToken,
    ) -> UpdateResult<UpdateRun> {
        let installed = self.filesystem.installed_manifests()?;
        let candidates = self
            .client
            .check_for_update(&installed, host_version, platform)
            .await?;

        let mut plugin_candidates = Vec::new();
        let mut host_candidate = None;
        for candidate in candidates {
            match candidate {
                UpdateCandidate::Plugin(p) => plugin_candidates.push(p),
                UpdateCandidate::Host(h) => host_candidate = Some(h),
            }
        }

        let plugin_reports = self
            .update_plugins(&installed, plugin_candidates, cancel)
            .await;

        Ok(UpdateRun {
            plugin_reports,
            host_candidate,
        })
    }

    /// Apply the given plugin candidates, each as an independent
    /// transaction. Transactions run concurrently up to the configured
    /// limit; failures are reported per plugin and never abort the
    /// others.
    pub async fn update_plugins(
        &self,
        installed: &[Manifest],
        candidates: Vec<PluginUpdateCandidate>,
        cancel: &CancellationToken,
    ) -> Vec<PluginUpdateReport> {
        let installed_versions: HashMap<String, SemanticVersion> = installed
            .iter()
            .map(|m| (m.name.clone(), m.version))
            .collect();

        let mut reports = Vec::new();
        let mut join_set = JoinSet::new();

        for candidate in candidates {
            if join_set.len() >= self.max_concurrent {
                // Wait for one transaction to finish before adding another
                if let Some(Ok(report)) = join_set.join_next().await {
                    reports.push(report);
                }
            }

            let client = Arc::clone(&self.client);
            let filesystem = self.filesystem.clone();
            let installed_version = installed_versions.get(&candidate.manifest.name).copied();
            let cancel = cancel.clone();
            join_set.spawn(async move {
                Self::update_single_plugin(client, filesystem, installed_version, candidate, cancel)
                    .await
            });
        }

        // Wait for all remaining transactions
        while let Some(result) = join_set.join_next().await {
            if let Ok(report) = result {
                reports.push(report);
            }
        }

        reports
    }

    /// One plugin's update transaction: version gate, download, backup,
    /// install, then cleanup on success or restore on failure.
    async fn update_single_plugin(
        client: Arc<dyn CatalogClient>,
        filesystem: UpdateFileSystem,
        installed_version: Option<SemanticVersion>,
        candidate: PluginUpdateCandidate,
        cancel: CancellationToken,
    ) -> PluginUpdateReport {
        let name = candidate.manifest.name;
        let version = candidate.manifest.version;

        // only strictly newer candidates proceed
        if let Some(current) = installed_version {
            if version <= current {
                debug!(plugin = %name, %version, installed = %current, "candidate not newer, skipping");
                return PluginUpdateReport {
                    name,
                    outcome: PluginUpdateOutcome::AlreadyCurrent,
                };
            }
        }

        match Self::download_plugin_artifact(client.as_ref(), &filesystem, &name, &version, &cancel)
            .await
        {
            Ok(Download::Complete) => {}
            Ok(Download::Cancelled) => {
                info!(plugin = %name, "download cancelled, reclaiming partial artifact");
                if let Err(e) = filesystem.cleanup_downloaded_plugin(&name) {
                    warn!(plugin = %name, error = %e, "failed to reclaim partial download");
                }
                return PluginUpdateReport {
                    name,
                    outcome: PluginUpdateOutcome::Cancelled,
                };
            }
            Err(e) => {
                // nothing destructive has happened yet
                if let Err(cleanup) = filesystem.cleanup_downloaded_plugin(&name) {
                    warn!(plugin = %name, error = %cleanup, "failed to reclaim partial download");
                }
                return PluginUpdateReport {
                    name,
                    outcome: PluginUpdateOutcome::Failed(e),
                };
            }
        }

        // from here the transaction runs to Restored or Installed;
        // cancellation is no longer consulted
        let store = filesystem.plugin_store(&name);
        let applied = store
            .back_up_old_version()
            .and_then(|()| store.install_new_version());

        if let Err(e) = applied {
            error!(plugin = %name, error = %e, "update failed, attempting restore");
            return match store.restore() {
                Ok(()) => {
                    if let Err(cleanup) = filesystem.cleanup_downloaded_plugin(&name) {
                        warn!(plugin = %name, error = %cleanup, "failed to discard downloaded artifact");
                    }
                    PluginUpdateReport {
                        name,
                        outcome: PluginUpdateOutcome::Failed(e),
                    }
                }
                Err(restore_error) => {
                    error!(plugin = %name, error = %restore_error, "restore failed, installation inconsistent");
                    PluginUpdateReport {
                        name: name.clone(),
                        outcome: PluginUpdateOutcome::Failed(UpdateError::Inconsistent {
                            plugin: name,
                            source: Box::new(restore_error),
                        }),
                    }
                }
            };
        }

        if let Err(e) = store.clean_up() {
            // the new version is in place, but transient state could not
            // be reclaimed; surface it rather than pretend it worked
            return PluginUpdateReport {
                name,
                outcome: PluginUpdateOutcome::Failed(e),
            };
        }

        info!(plugin = %name, %version, "plugin updated");
        PluginUpdateReport {
            name,
            outcome: PluginUpdateOutcome::Updated(version),
        }
    }

    /// Stream one plugin archive into its download slot, honoring
    /// cancellation between chunks.
    async fn download_plugin_artifact(
        client: &dyn CatalogClient,
        filesystem: &UpdateFileSystem,
        name: &str,
        version: &SemanticVersion,
        cancel: &CancellationToken,
    ) -> UpdateResult<Download> {
        if cancel.is_cancelled() {
            return Ok(Download::Cancelled);
        }

        let mut stream = client.download_plugin(name, version).await?;
        let mut file = filesystem.create_plugin_archive(name)?;

        loop {
            let chunk = tokio::select! {
                _ = cancel.cancelled() => return Ok(Download::Cancelled),
                chunk = stream.next_chunk() => chunk?,
            };
            match chunk {
                Some(bytes) => file.write_all(&bytes)?,
                None => break,
            }
        }

        file.flush()?;
        Ok(Download::Complete)
    }

    /// Download the host installer and hand it to the process runner.
    ///
    /// Failures surface before any process-terminating action; on
    /// success the caller receives [`HostUpdateOutcome::HandedOff`] and
    /// must terminate the running process itself.
    pub async fn update_host(
        &self,
        installed_version: &SemanticVersion,
        candidate: &HostUpdateCandidate,
        platform: Platform,
        cancel: &CancellationToken,
    ) -> UpdateResult<HostUpdateOutcome> {
        if candidate.version <= *installed_version {
            debug!(candidate = %candidate.version, installed = %installed_version, "host already current");
            return Ok(HostUpdateOutcome::AlreadyCurrent);
        }

        let file_name = host_installer_file_name(&candidate.version, platform);

        match self
            .download_host_artifact(&candidate.version, platform, &file_name, cancel)
            .await
        {
            Ok(Download::Complete) => {}
            Ok(Download::Cancelled) => {
                info!("host download cancelled, reclaiming partial installer");
                self.filesystem
                    .cleanup_downloaded_host_installer(&file_name)?;
                return Ok(HostUpdateOutcome::Cancelled);
            }
            Err(e) => {
                if let Err(cleanup) = self
                    .filesystem
                    .cleanup_downloaded_host_installer(&file_name)
                {
                    warn!(error = %cleanup, "failed to reclaim partial host installer");
                }
                return Err(e);
            }
        }

        let installer = self.filesystem.downloaded_host_installer(&file_name);
        self.process_runner.launch_installer(&installer)?;

        info!(version = %candidate.version, "host installer handed off");
        Ok(HostUpdateOutcome::HandedOff(installer))
    }

    async fn download_host_artifact(
        &self,
        version: &SemanticVersion,
        platform: Platform,
        file_name: &str,
        cancel: &CancellationToken,
    ) -> UpdateResult<Download> {
        if cancel.is_cancelled() {
            return Ok(Download::Cancelled);
        }

        let mut stream = self.client.download_host(version, platform).await?;
        let mut file = self.filesystem.create_host_installer(file_name)?;

        loop {
            let chunk = tokio::select! {
                _ = cancel.cancelled() => return Ok(Download::Cancelled),
                chunk = stream.next_chunk() => chunk?,
            };
            match chunk {
                Some(bytes) => file.write_all(&bytes)?,
                None => break,
            }
        }

        file.flush()?;
        Ok(Download::Complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::di::mocks::{MockCatalogClient, MockProcessRunner};
    use std::collections::HashMap as StdHashMap;
    use std::fs;
    use std::io::Write as _;
    use tempfile::TempDir;
    use zip::write::{FileOptions, ZipWriter};

    fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut cursor);
            for (name, content) in entries {
                zip.start_file(*name, FileOptions::default()).unwrap();
                zip.write_all(content).unwrap();
            }
            zip.finish().unwrap();
        }
        cursor.into_inner()
    }

    fn candidate(name: &str, version: SemanticVersion) -> PluginUpdateCandidate {
        PluginUpdateCandidate {
            manifest: Manifest::new(name, version),
            download_reference: format!("api/plugin/{}/{}/download", name, version),
        }
    }

    fn install_plugin(filesystem: &UpdateFileSystem, name: &str, version: &str, content: &[u8]) {
        let dir = filesystem.plugins_dir().join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{}.dll", name)), content).unwrap();
        fs::write(
            dir.join(format!("{}.plugin.manifest", name)),
            format!(r#"{{"Name":"{}","Version":"{}"}}"#, name, version),
        )
        .unwrap();
    }

    fn updater(client: &MockCatalogClient, temp: &TempDir) -> (Updater, MockProcessRunner) {
        let runner = MockProcessRunner::new();
        let updater = Updater::new(
            Arc::new(client.clone()),
            UpdateFileSystem::new(temp.path()),
            Arc::new(runner.clone()),
            None,
        );
        (updater, runner)
    }

    #[tokio::test]
    async fn test_update_plugin_happy_path() {
        let temp = TempDir::new().unwrap();
        let client = MockCatalogClient::new();
        let filesystem = UpdateFileSystem::new(temp.path());
        install_plugin(&filesystem, "Plugin0", "0.1.0.0", b"v1");

        let new_version = SemanticVersion::new(0, 2, 0, 0);
        client.add_plugin(
            candidate("Plugin0", new_version),
            zip_bytes(&[("Plugin0.dll", b"v2".as_slice())]),
        );

        let (updater, _) = updater(&client, &temp);
        let installed = filesystem.installed_manifests().unwrap();
        let reports = updater
            .update_plugins(
                &installed,
                vec![candidate("Plugin0", new_version)],
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(reports.len(), 1);
        assert!(reports[0].outcome.is_updated());

        let store = filesystem.plugin_store("Plugin0");
        assert_eq!(
            fs::read(store.installation_path().join("Plugin0.dll")).unwrap(),
            b"v2"
        );
        assert!(!store.has_backup());
        assert!(!store.download_dir().exists());
    }

    #[tokio::test]
    async fn test_no_update_when_not_strictly_newer() {
        let temp = TempDir::new().unwrap();
        let client = MockCatalogClient::new();
        let filesystem = UpdateFileSystem::new(temp.path());
        install_plugin(&filesystem, "Plugin0", "0.2.0.0", b"v2");

        // same version as installed
        let version = SemanticVersion::new(0, 2, 0, 0);
        client.add_plugin(
            candidate("Plugin0", version),
            zip_bytes(&[("Plugin0.dll", b"v2".as_slice())]),
        );

        let (updater, _) = updater(&client, &temp);
        let installed = filesystem.installed_manifests().unwrap();
        let reports = updater
            .update_plugins(
                &installed,
                vec![candidate("Plugin0", version)],
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(
            reports[0].outcome,
            PluginUpdateOutcome::AlreadyCurrent
        ));
        // zero download/backup/install calls
        assert!(client.download_requests().is_empty());
        assert!(!filesystem.plugin_store("Plugin0").has_backup());
    }

    #[tokio::test]
    async fn test_first_install_without_existing_version() {
        let temp = TempDir::new().unwrap();
        let client = MockCatalogClient::new();
        let filesystem = UpdateFileSystem::new(temp.path());

        let version = SemanticVersion::new(1, 0, 0, 0);
        client.add_plugin(
            candidate("Plugin0", version),
            zip_bytes(&[("Plugin0.dll", b"v1".as_slice())]),
        );

        let (updater, _) = updater(&client, &temp);
        let reports = updater
            .update_plugins(
                &[],
                vec![candidate("Plugin0", version)],
                &CancellationToken::new(),
            )
            .await;

        assert!(reports[0].outcome.is_updated());
        assert!(filesystem.plugin_store("Plugin0").is_installed());
    }

    #[tokio::test]
    async fn test_install_failure_triggers_restore() {
        let temp = TempDir::new().unwrap();
        let client = MockCatalogClient::new();
        let filesystem = UpdateFileSystem::new(temp.path());
        install_plugin(&filesystem, "Plugin0", "0.1.0.0", b"v1");

        // the downloaded "archive" is not a valid zip, so the install
        // step fails after the backup succeeded
        let version = SemanticVersion::new(0, 2, 0, 0);
        client.add_plugin(candidate("Plugin0", version), b"corrupt bytes".to_vec());

        let (updater, _) = updater(&client, &temp);
        let installed = filesystem.installed_manifests().unwrap();
        let reports = updater
            .update_plugins(
                &installed,
                vec![candidate("Plugin0", version)],
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(
            reports[0].outcome,
            PluginUpdateOutcome::Failed(UpdateError::Protocol(_))
        ));

        // restored to the original content, backup consumed
        let store = filesystem.plugin_store("Plugin0");
        assert_eq!(
            fs::read(store.installation_path().join("Plugin0.dll")).unwrap(),
            b"v1"
        );
        assert!(!store.has_backup());
    }

    #[tokio::test]
    async fn test_one_failure_does_not_abort_other_plugins() {
        let temp = TempDir::new().unwrap();
        let client = MockCatalogClient::new();
        let filesystem = UpdateFileSystem::new(temp.path());
        install_plugin(&filesystem, "Plugin0", "0.1.0.0", b"v1");
        install_plugin(&filesystem, "Plugin1", "0.1.0.0", b"v1");

        let version = SemanticVersion::new(0, 2, 0, 0);
        client.add_plugin(candidate("Plugin0", version), b"corrupt".to_vec());
        client.add_plugin(
            candidate("Plugin1", version),
            zip_bytes(&[("Plugin1.dll", b"v2".as_slice())]),
        );

        let (updater, _) = updater(&client, &temp);
        let installed = filesystem.installed_manifests().unwrap();
        let mut reports = updater
            .update_plugins(
                &installed,
                vec![candidate("Plugin0", version), candidate("Plugin1", version)],
                &CancellationToken::new(),
            )
            .await;
        reports.sort_by(|a, b| a.name.cmp(&b.name));

        assert!(matches!(
            reports[0].outcome,
            PluginUpdateOutcome::Failed(_)
        ));
        assert!(reports[1].outcome.is_updated());
        assert_eq!(
            fs::read(
                filesystem
                    .plugin_store("Plugin1")
                    .installation_path()
                    .join("Plugin1.dll")
            )
            .unwrap(),
            b"v2"
        );
    }

    #[tokio::test]
    async fn test_download_failure_leaves_installation_untouched() {
        let temp = TempDir::new().unwrap();
        let client = MockCatalogClient::new();
        let filesystem = UpdateFileSystem::new(temp.path());
        install_plugin(&filesystem, "Plugin0", "0.1.0.0", b"v1");

        let version = SemanticVersion::new(0, 2, 0, 0);
        client.add_plugin(candidate("Plugin0", version), Vec::new());
        client.fail_download("Plugin0");

        let (updater, _) = updater(&client, &temp);
        let installed = filesystem.installed_manifests().unwrap();
        let reports = updater
            .update_plugins(
                &installed,
                vec![candidate("Plugin0", version)],
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(
            reports[0].outcome,
            PluginUpdateOutcome::Failed(UpdateError::Download { status: 500, .. })
        ));

        let store = filesystem.plugin_store("Plugin0");
        assert_eq!(
            fs::read(store.installation_path().join("Plugin0.dll")).unwrap(),
            b"v1"
        );
        assert!(!store.has_backup());
        assert!(!store.download_dir().exists());
    }

    #[tokio::test]
    async fn test_cancelled_before_download_reclaims_nothing_destructive() {
        let temp = TempDir::new().unwrap();
        let client = MockCatalogClient::new();
        let filesystem = UpdateFileSystem::new(temp.path());
        install_plugin(&filesystem, "Plugin0", "0.1.0.0", b"v1");

        let version = SemanticVersion::new(0, 2, 0, 0);
        client.add_plugin(
            candidate("Plugin0", version),
            zip_bytes(&[("Plugin0.dll", b"v2".as_slice())]),
        );

        let cancel = CancellationToken::new();
        cancel.cancel();

        let (updater, _) = updater(&client, &temp);
        let installed = filesystem.installed_manifests().unwrap();
        let reports = updater
            .update_plugins(&installed, vec![candidate("Plugin0", version)], &cancel)
            .await;

        assert!(matches!(
            reports[0].outcome,
            PluginUpdateOutcome::Cancelled
        ));
        let store = filesystem.plugin_store("Plugin0");
        assert_eq!(
            fs::read(store.installation_path().join("Plugin0.dll")).unwrap(),
            b"v1"
        );
        assert!(!store.download_dir().exists());
    }

    #[tokio::test]
    async fn test_update_all_reports_host_without_applying_it() {
        let temp = TempDir::new().unwrap();
        let client = MockCatalogClient::new();
        let filesystem = UpdateFileSystem::new(temp.path());
        install_plugin(&filesystem, "Plugin0", "0.1.0.0", b"v1");

        let version = SemanticVersion::new(0, 2, 0, 0);
        client.add_plugin(
            candidate("Plugin0", version),
            zip_bytes(&[("Plugin0.dll", b"v2".as_slice())]),
        );

        let host_version = SemanticVersion::new(1, 3, 0, 0);
        let mut downloads = StdHashMap::new();
        downloads.insert(Platform::X64, "api/ime/1.3.0.0/x64/download".to_string());
        client.set_host(
            HostUpdateCandidate {
                version: host_version,
                platform_downloads: downloads,
            },
            b"msi".to_vec(),
        );

        let (updater, runner) = updater(&client, &temp);
        let run = updater
            .update_all(
                &SemanticVersion::new(1, 2, 0, 0),
                Platform::X64,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(run.plugin_reports.len(), 1);
        assert!(run.plugin_reports[0].outcome.is_updated());
        assert_eq!(run.host_candidate.as_ref().unwrap().version, host_version);
        // the host installer is not launched as part of update_all
        assert!(runner.launched().is_empty());
    }

    #[tokio::test]
    async fn test_update_host_hands_off_installer() {
        let temp = TempDir::new().unwrap();
        let client = MockCatalogClient::new();

        let host_version = SemanticVersion::new(1, 3, 0, 0);
        let mut downloads = StdHashMap::new();
        downloads.insert(Platform::X64, "api/ime/1.3.0.0/x64/download".to_string());
        let host = HostUpdateCandidate {
            version: host_version,
            platform_downloads: downloads,
        };
        client.set_host(host.clone(), b"msi bytes".to_vec());

        let (updater, runner) = updater(&client, &temp);
        let outcome = updater
            .update_host(
                &SemanticVersion::new(1, 2, 0, 0),
                &host,
                Platform::X64,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        match outcome {
            HostUpdateOutcome::HandedOff(installer) => {
                assert_eq!(fs::read(&installer).unwrap(), b"msi bytes");
                assert_eq!(runner.launched(), vec![installer]);
            }
            other => panic!("Expected HandedOff, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_host_already_current() {
        let temp = TempDir::new().unwrap();
        let client = MockCatalogClient::new();

        let host = HostUpdateCandidate {
            version: SemanticVersion::new(1, 2, 0, 0),
            platform_downloads: StdHashMap::new(),
        };

        let (updater, runner) = updater(&client, &temp);
        let outcome = updater
            .update_host(
                &SemanticVersion::new(1, 2, 0, 0),
                &host,
                Platform::X64,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert!(matches!(outcome, HostUpdateOutcome::AlreadyCurrent));
        assert!(runner.launched().is_empty());
        assert!(client.download_requests().is_empty());
    }

    #[tokio::test]
    async fn test_update_host_launch_failure_is_reported() {
        let temp = TempDir::new().unwrap();
        let client = MockCatalogClient::new();

        let host_version = SemanticVersion::new(1, 3, 0, 0);
        let mut downloads = StdHashMap::new();
        downloads.insert(Platform::X64, "api/ime/1.3.0.0/x64/download".to_string());
        let host = HostUpdateCandidate {
            version: host_version,
            platform_downloads: downloads,
        };
        client.set_host(host.clone(), b"msi".to_vec());

        let (updater, runner) = updater(&client, &temp);
        runner.fail_launches();

        let result = updater
            .update_host(
                &SemanticVersion::new(1, 2, 0, 0),
                &host,
                Platform::X64,
                &CancellationToken::new(),
            )
            .await;

        // the failure surfaces; no hand-off happened
        assert!(matches!(result, Err(UpdateError::Io(_))));
        assert!(runner.launched().is_empty());
    }

    #[tokio::test]
    async fn test_update_host_cancelled_reclaims_installer() {
        let temp = TempDir::new().unwrap();
        let client = MockCatalogClient::new();
        let filesystem = UpdateFileSystem::new(temp.path());

        let host_version = SemanticVersion::new(1, 3, 0, 0);
        let mut downloads = StdHashMap::new();
        downloads.insert(Platform::X64, "api/ime/1.3.0.0/x64/download".to_string());
        let host = HostUpdateCandidate {
            version: host_version,
            platform_downloads: downloads,
        };
        client.set_host(host.clone(), b"msi".to_vec());

        let cancel = CancellationToken::new();
        cancel.cancel();

        let (updater, runner) = updater(&client, &temp);
        let outcome = updater
            .update_host(&SemanticVersion::new(1, 2, 0, 0), &host, Platform::X64, &cancel)
            .await
            .unwrap();

        assert!(matches!(outcome, HostUpdateOutcome::Cancelled));
        assert!(runner.launched().is_empty());
        let file_name = host_installer_file_name(&host_version, Platform::X64);
        assert!(!filesystem.downloaded_host_installer(&file_name).exists());
    }
}
