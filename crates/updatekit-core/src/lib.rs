//! Core types for UpdateKit
//!
//! This crate holds the value types shared by every part of the update
//! service: the plugin `Manifest`, the four-component `SemanticVersion`,
//! the `Platform` enumeration for host installers, the `UpdateError`
//! taxonomy, and the well-known path helpers.

pub mod core;

pub use core::error::{UpdateError, UpdateResult};
pub use core::manifest::Manifest;
pub use core::platform::Platform;
pub use core::version::SemanticVersion;
