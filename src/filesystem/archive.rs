//! Plugin archive extraction
//!
//! Plugin artifacts are zip archives whose entries map 1:1 onto relative
//! file paths under the plugin's installation directory.

use std::fs::{self, File};
use std::io;
use std::path::Path;
use updatekit_core::{UpdateError, UpdateResult};
use zip::ZipArchive;

/// Extract every entry of `archive_path` into `dest`, recreating the
/// archive's internal directory structure. Existing files are
/// overwritten, so re-running after a partial failure resumes cleanly.
pub fn extract_archive(archive_path: &Path, dest: &Path) -> UpdateResult<()> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| UpdateError::Protocol(format!("Invalid plugin archive: {}", e)))?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| UpdateError::Protocol(format!("Invalid plugin archive entry: {}", e)))?;

        // Reject entries that would escape the destination directory.
        let relative = entry.enclosed_name().map(Path::to_path_buf).ok_or_else(|| {
            UpdateError::Protocol(format!("Unsafe path in plugin archive: {}", entry.name()))
        })?;

        let target = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&target)?;
            io::copy(&mut entry, &mut out)?;
        }
    }

    Ok(())
}
