// Copyright (c) 2025 - Cowboy AI, Inc.
//! Kernel configuration

use std::collections::HashMap;

use crate::domain::ExpressionResolver;
use crate::errors::{ModelError, ModelResult};
use crate::operation::DEFAULT_MAX_COMPOSITE_STEPS;

/// Default number of audit records kept
pub const DEFAULT_AUDIT_CAPACITY: usize = 256;

/// Configuration of a model kernel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelConfig {
    /// Properties available to `${name}` expressions
    pub properties: HashMap<String, String>,
    /// Whether `${env.NAME}` reads the process environment
    pub resolve_environment: bool,
    /// Audit records kept before the oldest are dropped
    pub audit_capacity: usize,
    /// Largest accepted composite
    pub max_composite_steps: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            properties: HashMap::new(),
            resolve_environment: false,
            audit_capacity: DEFAULT_AUDIT_CAPACITY,
            max_composite_steps: DEFAULT_MAX_COMPOSITE_STEPS,
        }
    }
}

impl KernelConfig {
    /// Load configuration from environment variables
    ///
    /// - `CIM_MODEL_PROPERTIES`: comma separated `key=value` pairs
    /// - `CIM_MODEL_RESOLVE_ENV`: `true` to allow `${env.NAME}`
    /// - `CIM_MODEL_AUDIT_CAPACITY`
    /// - `CIM_MODEL_MAX_COMPOSITE_STEPS`
    pub fn from_env() -> ModelResult<Self> {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("CIM_MODEL_PROPERTIES") {
            config.properties = parse_properties(&raw)?;
        }
        if let Ok(raw) = std::env::var("CIM_MODEL_RESOLVE_ENV") {
            config.resolve_environment = parse_flag("CIM_MODEL_RESOLVE_ENV", &raw)?;
        }
        if let Ok(raw) = std::env::var("CIM_MODEL_AUDIT_CAPACITY") {
            config.audit_capacity = parse_count("CIM_MODEL_AUDIT_CAPACITY", &raw)?;
        }
        if let Ok(raw) = std::env::var("CIM_MODEL_MAX_COMPOSITE_STEPS") {
            config.max_composite_steps = parse_count("CIM_MODEL_MAX_COMPOSITE_STEPS", &raw)?;
        }

        Ok(config)
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn resolver(&self) -> ExpressionResolver {
        ExpressionResolver::new(self.properties.clone(), self.resolve_environment)
    }
}

fn parse_properties(raw: &str) -> ModelResult<HashMap<String, String>> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .filter(|(k, _)| !k.is_empty())
                .ok_or_else(|| {
                    ModelError::Configuration(format!("Invalid property '{}', expected key=value", pair))
                })
        })
        .collect()
}

fn parse_flag(name: &str, raw: &str) -> ModelResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ModelError::Configuration(format!("{} must be a boolean, got '{}'", name, other))),
    }
}

fn parse_count(name: &str, raw: &str) -> ModelResult<usize> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ModelError::Configuration(format!(
            "{} must be a positive integer, got '{}'",
            name, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_properties() {
        let props = parse_properties("pool.size=10, unit = SECONDS,").unwrap();
        assert_eq!(props.get("pool.size").map(String::as_str), Some("10"));
        assert_eq!(props.get("unit").map(String::as_str), Some("SECONDS"));
        assert!(parse_properties("broken").is_err());
        assert!(parse_properties("=value").is_err());
    }

    #[test]
    fn test_parse_scalars() {
        assert!(parse_flag("X", "TRUE").unwrap());
        assert!(!parse_flag("X", "0").unwrap());
        assert!(parse_flag("X", "maybe").is_err());
        assert_eq!(parse_count("X", "16").unwrap(), 16);
        assert!(parse_count("X", "0").is_err());
    }

    #[test]
    fn test_resolver_uses_properties() {
        let config = KernelConfig::default().with_property("pool.size", "12");
        assert_eq!(config.resolver().resolve("${pool.size:1}").unwrap(), "12");
    }
}
