pub mod error;
pub mod manifest;
pub mod path;
pub mod platform;
pub mod version;

pub use error::{UpdateError, UpdateResult};
pub use manifest::Manifest;
pub use platform::Platform;
pub use version::SemanticVersion;
