// Copyright (c) 2025 - Cowboy AI, Inc.
//! Transformation Descriptions
//!
//! A [`TransformationDescription`] is the data+function pair describing how
//! one resource type differs at one older model version. It is built from
//! declarative rules rather than code per version:
//!
//! ```rust,ignore
//! TransformationDescription::new(ModelVersion::new(3, 0, 0))
//!     .reject_defined("statistics-enabled")
//!     .discard("statistics-enabled")
//!     .reject_expressions(["max-pool-size", "timeout"]);
//! ```
//!
//! # Rule Order (per attribute)
//!
//! 1. Rejections are checked against the stored value
//! 2. `default_if_undefined` fills a value the older version requires
//! 3. `rename` changes the key seen by the older version
//! 4. `discard` drops the attribute

use indexmap::IndexMap;
use std::fmt;

use super::TransformError;
use crate::domain::{ModelValue, ModelVersion};

/// One rule applied to one attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeRule {
    /// The attribute does not exist at this version
    Discard,
    /// Expressions have no representation at this version
    RejectExpressions,
    /// Any defined value has no representation at this version
    RejectDefined,
    /// The attribute is known under another name at this version
    Rename(String),
    /// The older version needs a concrete value where the current one is undefined
    DefaultIfUndefined(ModelValue),
}

/// Transformer for one resource type at one older version
pub trait ResourceTransformer: Send + Sync + fmt::Debug {
    /// Version this transformer produces (outbound) and accepts (inbound)
    fn version(&self) -> ModelVersion;

    /// Rewrite an attribute map from the next newer shape into this version's
    fn transform_attributes(
        &self,
        attributes: IndexMap<String, ModelValue>,
    ) -> Result<IndexMap<String, ModelValue>, TransformError>;

    /// Whether children of `child_type` survive; fails when present but rejected
    fn transform_children(&self, child_type: &str, present: bool) -> Result<bool, TransformError>;

    /// Map an attribute named by a caller at this version to the next newer name
    fn transform_inbound_attribute(
        &self,
        name: &str,
        value: Option<&ModelValue>,
    ) -> Result<String, TransformError>;

    /// Fail when a caller at this version addresses a child type it cannot know
    fn transform_inbound_child(&self, child_type: &str) -> Result<(), TransformError>;
}

/// Declarative rules for one (resource type, version) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformationDescription {
    version: ModelVersion,
    rules: IndexMap<String, Vec<AttributeRule>>,
    discarded_children: Vec<String>,
    rejected_children: Vec<String>,
}

impl TransformationDescription {
    pub fn new(version: ModelVersion) -> Self {
        Self {
            version,
            rules: IndexMap::new(),
            discarded_children: Vec::new(),
            rejected_children: Vec::new(),
        }
    }

    fn rule(mut self, attribute: impl Into<String>, rule: AttributeRule) -> Self {
        self.rules.entry(attribute.into()).or_default().push(rule);
        self
    }

    pub fn discard(self, attribute: impl Into<String>) -> Self {
        self.rule(attribute, AttributeRule::Discard)
    }

    pub fn reject_defined(self, attribute: impl Into<String>) -> Self {
        self.rule(attribute, AttributeRule::RejectDefined)
    }

    pub fn reject_expressions<I, S>(self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        attributes
            .into_iter()
            .fold(self, |desc, attribute| desc.rule(attribute, AttributeRule::RejectExpressions))
    }

    /// Current name `attribute` is called `legacy` at this version
    pub fn rename(self, attribute: impl Into<String>, legacy: impl Into<String>) -> Self {
        self.rule(attribute, AttributeRule::Rename(legacy.into()))
    }

    pub fn default_if_undefined(self, attribute: impl Into<String>, value: impl Into<ModelValue>) -> Self {
        self.rule(attribute, AttributeRule::DefaultIfUndefined(value.into()))
    }

    pub fn discard_children(mut self, child_type: impl Into<String>) -> Self {
        self.discarded_children.push(child_type.into());
        self
    }

    pub fn reject_children(mut self, child_type: impl Into<String>) -> Self {
        self.rejected_children.push(child_type.into());
        self
    }

    pub fn rules_for(&self, attribute: &str) -> &[AttributeRule] {
        self.rules.get(attribute).map(Vec::as_slice).unwrap_or(&[])
    }

    fn has_rule(&self, attribute: &str, wanted: &AttributeRule) -> bool {
        self.rules_for(attribute).contains(wanted)
    }

    fn legacy_name_of(&self, attribute: &str) -> Option<&str> {
        self.rules_for(attribute).iter().find_map(|rule| match rule {
            AttributeRule::Rename(legacy) => Some(legacy.as_str()),
            _ => None,
        })
    }

    fn current_name_of(&self, legacy: &str) -> Option<&str> {
        self.rules.iter().find_map(|(current, rules)| {
            rules
                .iter()
                .any(|rule| matches!(rule, AttributeRule::Rename(name) if name == legacy))
                .then_some(current.as_str())
        })
    }

    fn check_value(&self, attribute: &str, value: &ModelValue) -> Result<(), TransformError> {
        for rule in self.rules_for(attribute) {
            match rule {
                AttributeRule::RejectExpressions if value.is_expression() => {
                    return Err(TransformError::RejectedExpression {
                        attribute: attribute.to_string(),
                        version: self.version,
                    });
                }
                AttributeRule::RejectDefined if value.is_defined() => {
                    return Err(TransformError::RejectedDefined {
                        attribute: attribute.to_string(),
                        version: self.version,
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl ResourceTransformer for TransformationDescription {
    fn version(&self) -> ModelVersion {
        self.version
    }

    fn transform_attributes(
        &self,
        attributes: IndexMap<String, ModelValue>,
    ) -> Result<IndexMap<String, ModelValue>, TransformError> {
        let mut transformed = IndexMap::with_capacity(attributes.len());

        for (name, value) in attributes {
            self.check_value(&name, &value)?;

            let mut key = name.clone();
            let mut value = value;
            let mut keep = true;
            for rule in self.rules_for(&name) {
                match rule {
                    AttributeRule::DefaultIfUndefined(default) if !value.is_defined() => {
                        value = default.clone();
                    }
                    AttributeRule::Rename(legacy) => key = legacy.clone(),
                    AttributeRule::Discard => keep = false,
                    _ => {}
                }
            }

            if keep {
                transformed.insert(key, value);
            }
        }
        Ok(transformed)
    }

    fn transform_children(&self, child_type: &str, present: bool) -> Result<bool, TransformError> {
        if self.rejected_children.iter().any(|t| t == child_type) {
            if present {
                return Err(TransformError::RejectedChild {
                    child_type: child_type.to_string(),
                    version: self.version,
                });
            }
            return Ok(false);
        }
        Ok(!self.discarded_children.iter().any(|t| t == child_type))
    }

    fn transform_inbound_attribute(
        &self,
        name: &str,
        value: Option<&ModelValue>,
    ) -> Result<String, TransformError> {
        let unknown = || TransformError::UnknownAttribute {
            attribute: name.to_string(),
            version: self.version,
        };

        let current = match self.current_name_of(name) {
            Some(current) => current,
            // Renamed attributes are only known under their legacy name here
            None if self.legacy_name_of(name).is_some() => return Err(unknown()),
            None => name,
        };

        if self.has_rule(current, &AttributeRule::Discard) {
            return Err(unknown());
        }
        if let Some(value) = value {
            self.check_value(current, value)?;
        }
        Ok(current.to_string())
    }

    fn transform_inbound_child(&self, child_type: &str) -> Result<(), TransformError> {
        let known = !self.rejected_children.iter().any(|t| t == child_type)
            && !self.discarded_children.iter().any(|t| t == child_type);
        if known {
            Ok(())
        } else {
            Err(TransformError::RejectedChild {
                child_type: child_type.to_string(),
                version: self.version,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn attrs(pairs: &[(&str, ModelValue)]) -> IndexMap<String, ModelValue> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn v3() -> TransformationDescription {
        TransformationDescription::new(ModelVersion::new(3, 0, 0))
            .reject_defined("statistics-enabled")
            .discard("statistics-enabled")
            .reject_expressions(["max-pool-size"])
            .rename("timeout-unit", "unit")
            .default_if_undefined("timeout", 5i64)
    }

    #[test]
    fn test_outbound_rules() {
        let transformed = v3()
            .transform_attributes(attrs(&[
                ("max-pool-size", ModelValue::Int(10)),
                ("statistics-enabled", ModelValue::Undefined),
                ("timeout", ModelValue::Undefined),
                ("timeout-unit", ModelValue::from("SECONDS")),
            ]))
            .unwrap();

        assert_eq!(
            transformed,
            attrs(&[
                ("max-pool-size", ModelValue::Int(10)),
                ("timeout", ModelValue::Long(5)),
                ("unit", ModelValue::from("SECONDS")),
            ])
        );
    }

    #[test]
    fn test_outbound_rejections() {
        let err = v3()
            .transform_attributes(attrs(&[("statistics-enabled", ModelValue::Boolean(true))]))
            .unwrap_err();
        assert!(matches!(err, TransformError::RejectedDefined { .. }));

        let err = v3()
            .transform_attributes(attrs(&[("max-pool-size", ModelValue::from("${pool.size:5}"))]))
            .unwrap_err();
        assert!(matches!(err, TransformError::RejectedExpression { .. }));
    }

    #[test]
    fn test_inbound_attribute_mapping() {
        let desc = v3();
        assert_eq!(desc.transform_inbound_attribute("unit", None).unwrap(), "timeout-unit");
        assert!(matches!(
            desc.transform_inbound_attribute("timeout-unit", None),
            Err(TransformError::UnknownAttribute { .. })
        ));
        assert!(matches!(
            desc.transform_inbound_attribute("statistics-enabled", Some(&ModelValue::Boolean(true))),
            Err(TransformError::UnknownAttribute { .. })
        ));
        assert!(matches!(
            desc.transform_inbound_attribute("max-pool-size", Some(&ModelValue::from("${x}"))),
            Err(TransformError::RejectedExpression { .. })
        ));
        assert_eq!(
            desc.transform_inbound_attribute("max-pool-size", Some(&ModelValue::Int(3)))
                .unwrap(),
            "max-pool-size"
        );
    }

    #[test]
    fn test_children_rules() {
        let desc = TransformationDescription::new(ModelVersion::new(1, 0, 0))
            .discard_children("cache")
            .reject_children("timer-service");

        assert!(desc.transform_children("pool", true).unwrap());
        assert!(!desc.transform_children("cache", true).unwrap());
        assert!(!desc.transform_children("timer-service", false).unwrap());
        assert!(desc.transform_children("timer-service", true).is_err());
        assert!(desc.transform_inbound_child("cache").is_err());
        assert!(desc.transform_inbound_child("pool").is_ok());
    }
}
