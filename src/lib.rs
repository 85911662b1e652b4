//! UpdateKit — update service for plugin-hosting applications
//!
//! This crate keeps a local installation current against a remote update
//! server: it discovers newer versions of installed plugins and of the
//! host application itself, streams the corresponding artifacts to disk,
//! and applies them with backup/restore semantics so a failed install can
//! be rolled back.
//!
//! The service is consumed programmatically; there is no CLI surface.
//! Wire the pieces together with plain constructor injection:
//!
//! - [`client::UpdateServerClient`] talks to the update server,
//! - [`filesystem::UpdateFileSystem`] owns the on-disk layout,
//! - [`updater::Updater`] sequences check → download → backup → install →
//!   cleanup-or-restore.
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use updatekit::client::UpdateServerClient;
//! use updatekit::config::UpdateConfig;
//! use updatekit::filesystem::UpdateFileSystem;
//! use updatekit::updater::{SystemProcessRunner, Updater};
//! use updatekit::{Platform, SemanticVersion};
//!
//! # async fn run() -> updatekit::UpdateResult<()> {
//! let config = UpdateConfig::load()?;
//! let updater = Updater::new(
//!     Arc::new(UpdateServerClient::new(config.server_address())?),
//!     UpdateFileSystem::new(config.get_data_dir()?),
//!     Arc::new(SystemProcessRunner),
//!     Some(config.max_concurrent_updates),
//! );
//!
//! let host_version = SemanticVersion::new(1, 2, 0, 0);
//! let run = updater
//!     .update_all(&host_version, Platform::current(), &CancellationToken::new())
//!     .await?;
//! for report in &run.plugin_reports {
//!     println!("{}: {:?}", report.name, report.outcome);
//! }
//! # Ok(())
//! # }
//! ```

pub use updatekit_core::{Manifest, Platform, SemanticVersion, UpdateError, UpdateResult};

/// Core module re-exported for convenience.
pub mod core {
    pub use updatekit_core::core::*;
    pub use updatekit_core::*;

    /// Path module re-exported from updatekit-core.
    pub mod path {
        pub use updatekit_core::core::path::*;
    }
}

/// Configuration management.
pub mod config;

/// Update catalog client (discovery queries and artifact downloads).
pub mod client;

/// Artifact store: install/backup/restore/cleanup on the local disk.
pub mod filesystem;

/// Update orchestration (the end-to-end transaction per plugin or host).
pub mod updater;

/// Dependency injection infrastructure.
pub mod di;
