//! Artifact store: the on-disk layout of installed plugins, backups and
//! download caches.
//!
//! `UpdateFileSystem` owns the shared layout rooted at a well-known
//! application-data location and hands out one [`PluginStore`] per
//! plugin for the install/backup/restore cycle. Download-side paths are
//! deterministic so an aborted transfer can be found and reclaimed
//! later.

pub mod archive;
pub mod plugin;

pub use plugin::{PluginStore, PLUGIN_ARCHIVE_EXTENSION};

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use updatekit_core::core::path::update_home;
use updatekit_core::{Manifest, Platform, SemanticVersion, UpdateResult};
use walkdir::WalkDir;

use crate::client::HOST_KEY;

/// Suffix of the manifest file each installed plugin carries next to its
/// binaries.
pub const PLUGIN_MANIFEST_SUFFIX: &str = ".plugin.manifest";

/// File name the host installer for a given version/platform is stored
/// under in the host download directory.
pub fn host_installer_file_name(version: &SemanticVersion, platform: Platform) -> String {
    format!("{}-{}-{}.msi", HOST_KEY, version, platform)
}

/// Shared on-disk layout of the update service.
#[derive(Debug, Clone)]
pub struct UpdateFileSystem {
    root: PathBuf,
}

impl UpdateFileSystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Layout rooted at the platform's application-data location.
    pub fn from_default_location() -> UpdateResult<Self> {
        Ok(Self::new(update_home()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one installation directory per plugin name.
    pub fn plugins_dir(&self) -> PathBuf {
        self.root.join("plugins")
    }

    /// Directory holding one temporary backup directory per plugin name.
    pub fn backup_dir(&self) -> PathBuf {
        self.root.join("backup")
    }

    /// Shared download cache for plugin archives.
    pub fn plugin_downloads_dir(&self) -> PathBuf {
        self.root.join("downloads").join("plugins")
    }

    /// Shared download cache for host installers.
    pub fn host_downloads_dir(&self) -> PathBuf {
        self.root.join("downloads").join("host")
    }

    /// The per-plugin state machine handle for install/backup/restore.
    pub fn plugin_store(&self, name: &str) -> PluginStore {
        PluginStore::new(
            name.to_string(),
            self.plugins_dir().join(name),
            self.backup_dir().join(name),
            self.plugin_downloads_dir().join(name),
        )
    }

    /// Open a fresh writable file at the deterministic download path for
    /// a plugin archive, creating parent directories as needed.
    pub fn create_plugin_archive(&self, name: &str) -> UpdateResult<File> {
        let path = self.plugin_store(name).archive_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        debug!(plugin = %name, path = %path.display(), "creating plugin download slot");
        Ok(File::create(path)?)
    }

    /// Open a fresh writable file at the deterministic download path for
    /// a host installer, creating parent directories as needed.
    pub fn create_host_installer(&self, file_name: &str) -> UpdateResult<File> {
        let dir = self.host_downloads_dir();
        fs::create_dir_all(&dir)?;
        let path = dir.join(file_name);
        debug!(path = %path.display(), "creating host installer download slot");
        Ok(File::create(path)?)
    }

    /// Compute the plugin archive's download path, ensuring its
    /// directory exists so later existence checks and cleanup have a
    /// stable location to look at.
    pub fn downloaded_plugin_archive(&self, name: &str) -> UpdateResult<PathBuf> {
        let store = self.plugin_store(name);
        fs::create_dir_all(store.download_dir())?;
        Ok(store.archive_path())
    }

    /// Compute the host installer's download path without touching the
    /// disk.
    pub fn downloaded_host_installer(&self, file_name: &str) -> PathBuf {
        self.host_downloads_dir().join(file_name)
    }

    /// Delete a plugin's download-side artifact and its containing
    /// directory. Used when a download is aborted mid-stream,
    /// independent of the install/backup/restore cycle.
    pub fn cleanup_downloaded_plugin(&self, name: &str) -> UpdateResult<()> {
        let dir = self.plugin_downloads_dir().join(name);
        debug!(plugin = %name, "discarding downloaded plugin artifact");
        match fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a downloaded host installer. Tolerates the file being
    /// absent already.
    pub fn cleanup_downloaded_host_installer(&self, file_name: &str) -> UpdateResult<()> {
        let path = self.downloaded_host_installer(file_name);
        debug!(path = %path.display(), "discarding downloaded host installer");
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Read the manifests of every installed plugin.
    ///
    /// Scans `<plugins dir>/<name>/<name>.plugin.manifest`. Unreadable
    /// or malformed manifest files are skipped with a warning so one
    /// broken plugin does not hide the rest from the update check.
    pub fn installed_manifests(&self) -> UpdateResult<Vec<Manifest>> {
        let plugins_dir = self.plugins_dir();
        if !plugins_dir.exists() {
            return Ok(Vec::new());
        }

        let mut manifests = Vec::new();
        for entry in WalkDir::new(&plugins_dir)
            .min_depth(2)
            .max_depth(2)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file()
                || !path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(PLUGIN_MANIFEST_SUFFIX))
            {
                continue;
            }

            match Manifest::load(path) {
                Ok(manifest) => manifests.push(manifest),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable plugin manifest");
                }
            }
        }

        Ok(manifests)
    }
}
