use serde::{Deserialize, Serialize};
use std::fmt;

/// CPU architecture a host-application installer is built for.
///
/// Spelled lowercase (`x86`/`x64`) in URL paths and wire bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    X86,
    X64,
}

impl Platform {
    /// The platform of the running process.
    pub fn current() -> Self {
        if cfg!(target_arch = "x86") {
            Platform::X86
        } else {
            Platform::X64
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::X86 => write!(f, "x86"),
            Platform::X64 => write!(f, "x64"),
        }
    }
}
