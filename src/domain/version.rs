// Copyright (c) 2025 - Cowboy AI, Inc.
//! Model Version Value Object
//!
//! Versions order lexicographically by `(major, minor, micro)`. The text form
//! is `major.minor.micro`; a missing micro component parses as `0`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid model version: {0}")]
pub struct VersionError(pub String);

/// Schema version of a subsystem's management model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelVersion {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
}

impl ModelVersion {
    pub const fn new(major: u32, minor: u32, micro: u32) -> Self {
        Self {
            major,
            minor,
            micro,
        }
    }
}

impl fmt::Display for ModelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)
    }
}

impl FromStr for ModelVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .trim()
            .split('.')
            .map(|p| p.parse::<u32>().map_err(|_| VersionError(s.to_string())))
            .collect::<Result<Vec<_>, _>>()?;

        match parts.as_slice() {
            [major, minor] => Ok(Self::new(*major, *minor, 0)),
            [major, minor, micro] => Ok(Self::new(*major, *minor, *micro)),
            _ => Err(VersionError(s.to_string())),
        }
    }
}

impl Serialize for ModelVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ModelVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("5.0.0".parse::<ModelVersion>().unwrap(), ModelVersion::new(5, 0, 0));
        assert_eq!("1.2".parse::<ModelVersion>().unwrap(), ModelVersion::new(1, 2, 0));
        assert!("1".parse::<ModelVersion>().is_err());
        assert!("1.x.0".parse::<ModelVersion>().is_err());
    }

    #[test]
    fn test_ordering() {
        let mut versions = vec![
            ModelVersion::new(4, 0, 0),
            ModelVersion::new(1, 2, 0),
            ModelVersion::new(5, 0, 0),
            ModelVersion::new(1, 2, 1),
        ];
        versions.sort();
        assert_eq!(versions.first(), Some(&ModelVersion::new(1, 2, 0)));
        assert_eq!(versions.last(), Some(&ModelVersion::new(5, 0, 0)));
    }

    #[test]
    fn test_serde_as_string() {
        let v = ModelVersion::new(3, 0, 0);
        assert_eq!(serde_json::to_value(v).unwrap(), serde_json::json!("3.0.0"));
    }
}
