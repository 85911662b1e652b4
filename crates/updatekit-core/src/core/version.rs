use crate::core::error::{UpdateError, UpdateResult};
use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Four-component version (`major.minor.patch.build`).
///
/// Ordering is lexicographic over the components, which gives a strict
/// total order; equality is component-wise. Versions travel on the wire
/// and in manifest files as dotted strings, so the serde implementations
/// go through `Display`/`FromStr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub build: u64,
}

impl SemanticVersion {
    pub fn new(major: u64, minor: u64, patch: u64, build: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            build,
        }
    }

    /// Parse a dotted version string with two to four components
    /// (e.g. "1.2", "1.2.3", "1.2.3.4"). Missing components are zero.
    pub fn parse(s: &str) -> UpdateResult<Self> {
        let s = s.trim();
        let parts: Vec<&str> = s.split('.').collect();

        if parts.len() < 2 || parts.len() > 4 {
            return Err(UpdateError::Version(format!(
                "Invalid version format: {}",
                s
            )));
        }

        let mut components = [0u64; 4];
        for (i, part) in parts.iter().enumerate() {
            components[i] = part
                .parse()
                .map_err(|_| UpdateError::Version(format!("Invalid version component: {}", s)))?;
        }

        Ok(Self {
            major: components[0],
            minor: components[1],
            patch: components[2],
            build: components[3],
        })
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.patch, self.build
        )
    }
}

impl FromStr for SemanticVersion {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for SemanticVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

struct SemanticVersionVisitor;

impl Visitor<'_> for SemanticVersionVisitor {
    type Value = SemanticVersion;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a dotted version string such as \"1.2.3.4\"")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        SemanticVersion::parse(value).map_err(|e| E::custom(e.to_string()))
    }
}

impl<'de> Deserialize<'de> for SemanticVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(SemanticVersionVisitor)
    }
}
