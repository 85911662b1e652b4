//! Per-plugin on-disk state machine
//!
//! One `PluginStore` owns one plugin's installation, backup and download
//! locations and moves it through Clean → Backed-up → Installed →
//! Clean/Restored during an update attempt. Paths are computed
//! deterministically from the plugin name at construction and never
//! change afterwards; instances for different plugins own disjoint
//! directories and may be driven in parallel.

use crate::filesystem::archive;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use updatekit_core::UpdateResult;

/// Extension of downloaded plugin archives.
pub const PLUGIN_ARCHIVE_EXTENSION: &str = "cdp4ck";

pub struct PluginStore {
    name: String,
    installation_path: PathBuf,
    backup_path: PathBuf,
    download_dir: PathBuf,
}

impl PluginStore {
    pub(crate) fn new(
        name: String,
        installation_path: PathBuf,
        backup_path: PathBuf,
        download_dir: PathBuf,
    ) -> Self {
        Self {
            name,
            installation_path,
            backup_path,
            download_dir,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn installation_path(&self) -> &Path {
        &self.installation_path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Path the downloaded archive for this plugin lives at.
    pub fn archive_path(&self) -> PathBuf {
        self.download_dir
            .join(format!("{}.{}", self.name, PLUGIN_ARCHIVE_EXTENSION))
    }

    pub fn is_installed(&self) -> bool {
        self.installation_path.exists()
    }

    pub fn has_backup(&self) -> bool {
        self.backup_path.exists()
    }

    /// Move the installed version aside into the backup location.
    ///
    /// No-op on a first-time install (no installation directory). The
    /// whole directory is renamed, not copied; fails if the backup
    /// location already exists or the source is locked.
    pub fn back_up_old_version(&self) -> UpdateResult<()> {
        if !self.installation_path.exists() {
            debug!(plugin = %self.name, "nothing installed, skipping backup");
            return Ok(());
        }

        if self.backup_path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("backup location already exists: {}", self.backup_path.display()),
            )
            .into());
        }

        if let Some(parent) = self.backup_path.parent() {
            fs::create_dir_all(parent)?;
        }

        debug!(plugin = %self.name, "backing up installed version");
        fs::rename(&self.installation_path, &self.backup_path)?;
        Ok(())
    }

    /// Extract the downloaded archive into the installation directory.
    ///
    /// Requires the archive to exist at [`PluginStore::archive_path`].
    /// Re-running overwrites already-extracted files, but the operation
    /// is not atomic: a crash mid-extraction leaves a half-upgraded
    /// installation behind. Does not touch the backup.
    pub fn install_new_version(&self) -> UpdateResult<()> {
        let archive_path = self.archive_path();
        if !archive_path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("downloaded archive not found: {}", archive_path.display()),
            )
            .into());
        }

        fs::create_dir_all(&self.installation_path)?;

        debug!(plugin = %self.name, "installing new version");
        archive::extract_archive(&archive_path, &self.installation_path)
    }

    /// Put the backed-up version back in place.
    ///
    /// No-op when no backup exists. Otherwise the (possibly broken)
    /// installation directory is deleted unconditionally and the backup
    /// renamed into its place. If the delete succeeds but the rename
    /// fails the plugin ends up uninstalled; that window is accepted and
    /// surfaces as the rename's IO error.
    pub fn restore(&self) -> UpdateResult<()> {
        if !self.backup_path.exists() {
            debug!(plugin = %self.name, "no backup present, skipping restore");
            return Ok(());
        }

        if self.installation_path.exists() {
            fs::remove_dir_all(&self.installation_path)?;
        }

        debug!(plugin = %self.name, "restoring backed-up version");
        fs::rename(&self.backup_path, &self.installation_path)?;
        Ok(())
    }

    /// Delete the transient directories of a completed update: the
    /// download directory and the backup. Already-absent paths are fine;
    /// only genuine I/O failures propagate. Only safe once the new
    /// version is installed and verified.
    pub fn clean_up(&self) -> UpdateResult<()> {
        debug!(plugin = %self.name, "cleaning up transient directories");
        remove_dir_all_if_exists(&self.download_dir)?;
        remove_dir_all_if_exists(&self.backup_path)?;
        Ok(())
    }
}

fn remove_dir_all_if_exists(path: &Path) -> UpdateResult<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
