//! Host installer hand-off

use crate::di::traits::ProcessRunner;
use std::path::Path;
use updatekit_core::UpdateResult;

/// Launches installers through the operating system's standard elevated
/// installation mechanism. The installer runs out-of-process; the host
/// application is expected to terminate itself once the hand-off has
/// succeeded.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    #[cfg(windows)]
    fn launch_installer(&self, installer: &Path) -> UpdateResult<()> {
        use std::process::Command;

        tracing::info!(installer = %installer.display(), "launching host installer");
        Command::new("msiexec").arg("/i").arg(installer).spawn()?;
        Ok(())
    }

    #[cfg(not(windows))]
    fn launch_installer(&self, installer: &Path) -> UpdateResult<()> {
        Err(updatekit_core::UpdateError::Config(format!(
            "No installer launch mechanism on this platform for {}",
            installer.display()
        )))
    }
}
