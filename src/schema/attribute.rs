// Copyright (c) 2025 - Cowboy AI, Inc.
//! Attribute Definitions
//!
//! An [`AttributeDefinition`] describes one attribute of a resource type:
//! its value type, optional default, allowed values, whether it accepts
//! `${...}` expressions, and an optional *undefined alias* - a sentinel value
//! that is stored as `Undefined` (e.g. `derive-size=none`).
//!
//! # Validation Order
//!
//! 1. `Undefined` passes unless the attribute is required without a default
//! 2. Expressions pass only if the attribute accepts them (type check deferred)
//! 3. Type coercion (`"10"` → `Int(10)`, `Int` → `Long`, scalars → `String`)
//! 4. Range check for numeric types
//! 5. Allowed-value membership
//! 6. Undefined-alias correction

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::ModelValue;

/// Attribute validation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Value cannot be coerced to the declared type
    #[error("Invalid value '{value}' for attribute '{attribute}': expected {expected}")]
    TypeMismatch {
        attribute: String,
        value: String,
        expected: AttributeType,
    },

    /// Value is not one of the allowed values
    #[error("Invalid value '{value}' for attribute '{attribute}': allowed values are [{allowed}]")]
    NotAllowed {
        attribute: String,
        value: String,
        allowed: String,
    },

    /// Numeric value outside the declared range
    #[error("Invalid value '{value}' for attribute '{attribute}': must be between {min} and {max}")]
    OutOfRange {
        attribute: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Expression supplied for an attribute that only accepts literals
    #[error("Attribute '{attribute}' does not support expressions: '{value}'")]
    ExpressionNotAllowed { attribute: String, value: String },

    /// Required attribute left undefined
    #[error("Attribute '{attribute}' is required and may not be undefined")]
    Required { attribute: String },

    /// Attribute not declared by the resource type
    #[error("Unknown attribute '{attribute}' for resource type '{resource_type}'")]
    UnknownAttribute {
        resource_type: String,
        attribute: String,
    },

    /// Reference to a child resource that does not exist
    #[error("Attribute '{attribute}' references unknown {child_type} '{value}'")]
    UnknownReference {
        attribute: String,
        child_type: String,
        value: String,
    },
}

/// Declared value type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributeType {
    Boolean,
    Int,
    Long,
    String,
    /// List of strings
    List,
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeType::Boolean => "BOOLEAN",
            AttributeType::Int => "INT",
            AttributeType::Long => "LONG",
            AttributeType::String => "STRING",
            AttributeType::List => "LIST",
        };
        write!(f, "{}", name)
    }
}

/// Definition of a single resource attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDefinition {
    name: String,
    attribute_type: AttributeType,
    default: Option<ModelValue>,
    allowed_values: Vec<ModelValue>,
    allow_expression: bool,
    required: bool,
    range: Option<(i64, i64)>,
    undefined_alias: Option<ModelValue>,
    references: Option<String>,
}

impl AttributeDefinition {
    pub fn new(name: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attribute_type,
            default: None,
            allowed_values: Vec::new(),
            allow_expression: false,
            required: false,
            range: None,
            undefined_alias: None,
            references: None,
        }
    }

    /// Value reported on read when the stored value is undefined
    pub fn with_default(mut self, value: impl Into<ModelValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_allowed_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ModelValue>,
    {
        self.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn allow_expression(mut self) -> Self {
        self.allow_expression = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_range(mut self, min: i64, max: i64) -> Self {
        self.range = Some((min, max));
        self
    }

    /// Writing this value stores `Undefined`
    pub fn with_undefined_alias(mut self, value: impl Into<ModelValue>) -> Self {
        self.undefined_alias = Some(value.into());
        self
    }

    /// Value must name an existing child of the owning resource
    pub fn references(mut self, child_type: impl Into<String>) -> Self {
        self.references = Some(child_type.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute_type(&self) -> AttributeType {
        self.attribute_type
    }

    pub fn default_value(&self) -> Option<&ModelValue> {
        self.default.as_ref()
    }

    pub fn allowed_values(&self) -> &[ModelValue] {
        &self.allowed_values
    }

    pub fn is_expression_allowed(&self) -> bool {
        self.allow_expression
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn referenced_child_type(&self) -> Option<&str> {
        self.references.as_deref()
    }

    /// Type-coerce and check a raw value
    pub fn validate(&self, raw: ModelValue) -> Result<ModelValue, ValidationError> {
        match raw {
            ModelValue::Undefined => {
                if self.required && self.default.is_none() {
                    return Err(ValidationError::Required {
                        attribute: self.name.clone(),
                    });
                }
                Ok(ModelValue::Undefined)
            }
            value if value.is_expression() => {
                if !self.allow_expression {
                    return Err(ValidationError::ExpressionNotAllowed {
                        attribute: self.name.clone(),
                        value: value.to_string(),
                    });
                }
                Ok(value)
            }
            value => {
                let coerced = self.coerce(value)?;
                self.check_range(&coerced)?;
                self.check_allowed(&coerced)?;

                match &self.undefined_alias {
                    Some(alias) if *alias == coerced => Ok(ModelValue::Undefined),
                    _ => Ok(coerced),
                }
            }
        }
    }

    /// Value visible to readers: the stored value, or the declared default
    pub fn resolve_for_read(&self, stored: &ModelValue) -> ModelValue {
        if stored.is_defined() {
            stored.clone()
        } else {
            self.default.clone().unwrap_or(ModelValue::Undefined)
        }
    }

    fn coerce(&self, value: ModelValue) -> Result<ModelValue, ValidationError> {
        let mismatch = |value: &ModelValue| ValidationError::TypeMismatch {
            attribute: self.name.clone(),
            value: value.to_string(),
            expected: self.attribute_type,
        };

        match (self.attribute_type, value) {
            (AttributeType::Boolean, ModelValue::Boolean(b)) => Ok(ModelValue::Boolean(b)),
            (AttributeType::Boolean, ModelValue::String(s)) => {
                match s.to_ascii_lowercase().as_str() {
                    "true" => Ok(ModelValue::Boolean(true)),
                    "false" => Ok(ModelValue::Boolean(false)),
                    _ => Err(mismatch(&ModelValue::String(s))),
                }
            }
            (AttributeType::Int, ModelValue::Int(i)) => Ok(ModelValue::Int(i)),
            (AttributeType::Int, ModelValue::Long(l)) => i32::try_from(l)
                .map(ModelValue::Int)
                .map_err(|_| mismatch(&ModelValue::Long(l))),
            (AttributeType::Int, ModelValue::String(s)) => s
                .trim()
                .parse::<i32>()
                .map(ModelValue::Int)
                .map_err(|_| mismatch(&ModelValue::String(s))),
            (AttributeType::Long, ModelValue::Int(i)) => Ok(ModelValue::Long(i64::from(i))),
            (AttributeType::Long, ModelValue::Long(l)) => Ok(ModelValue::Long(l)),
            (AttributeType::Long, ModelValue::String(s)) => s
                .trim()
                .parse::<i64>()
                .map(ModelValue::Long)
                .map_err(|_| mismatch(&ModelValue::String(s))),
            (AttributeType::String, ModelValue::List(items)) => {
                Err(mismatch(&ModelValue::List(items)))
            }
            (AttributeType::String, scalar) => Ok(ModelValue::String(scalar.to_string())),
            (AttributeType::List, ModelValue::List(items)) => items
                .into_iter()
                .map(|item| match item {
                    ModelValue::List(_) | ModelValue::Undefined => Err(mismatch(&item)),
                    scalar => Ok(ModelValue::String(scalar.to_string())),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(ModelValue::List),
            (_, other) => Err(mismatch(&other)),
        }
    }

    fn check_range(&self, value: &ModelValue) -> Result<(), ValidationError> {
        if let (Some((min, max)), Some(n)) = (self.range, value.as_i64()) {
            if n < min || n > max {
                return Err(ValidationError::OutOfRange {
                    attribute: self.name.clone(),
                    value: n,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }

    fn check_allowed(&self, value: &ModelValue) -> Result<(), ValidationError> {
        if self.allowed_values.is_empty() || self.allowed_values.contains(value) {
            return Ok(());
        }
        Err(ValidationError::NotAllowed {
            attribute: self.name.clone(),
            value: value.to_string(),
            allowed: self
                .allowed_values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn derive_size() -> AttributeDefinition {
        AttributeDefinition::new("derive-size", AttributeType::String)
            .with_allowed_values(["none", "from-worker-pools", "from-cpu-count"])
            .with_undefined_alias("none")
    }

    fn max_pool_size() -> AttributeDefinition {
        AttributeDefinition::new("max-pool-size", AttributeType::Int)
            .with_default(20)
            .with_range(1, i64::from(i32::MAX))
            .allow_expression()
    }

    #[test_case(ModelValue::Int(5), ModelValue::Int(5) ; "int literal")]
    #[test_case(ModelValue::from("7"), ModelValue::Int(7) ; "numeric string")]
    #[test_case(ModelValue::Long(9), ModelValue::Int(9) ; "long within range")]
    #[test_case(ModelValue::from("${pool:5}"), ModelValue::from("${pool:5}") ; "expression kept")]
    fn test_int_coercion(raw: ModelValue, expected: ModelValue) {
        assert_eq!(max_pool_size().validate(raw).unwrap(), expected);
    }

    #[test]
    fn test_type_mismatch() {
        let err = max_pool_size().validate(ModelValue::from("ten")).unwrap_err();
        assert!(matches!(err, ValidationError::TypeMismatch { .. }));
        assert!(err.to_string().contains("max-pool-size"));
        assert!(err.to_string().contains("ten"));
    }

    #[test]
    fn test_range() {
        let err = max_pool_size().validate(ModelValue::Int(0)).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { min: 1, .. }));
    }

    #[test]
    fn test_allowed_values_and_alias() {
        let def = derive_size();
        assert_eq!(
            def.validate(ModelValue::from("from-cpu-count")).unwrap(),
            ModelValue::from("from-cpu-count")
        );
        assert_eq!(def.validate(ModelValue::from("none")).unwrap(), ModelValue::Undefined);

        let err = def.validate(ModelValue::from("sometimes")).unwrap_err();
        assert!(matches!(err, ValidationError::NotAllowed { .. }));
    }

    #[test]
    fn test_expression_rejected_when_not_allowed() {
        let err = derive_size().validate(ModelValue::from("${size}")).unwrap_err();
        assert!(matches!(err, ValidationError::ExpressionNotAllowed { .. }));
    }

    #[test]
    fn test_required_without_default() {
        let def = AttributeDefinition::new("path", AttributeType::String).required();
        assert!(matches!(
            def.validate(ModelValue::Undefined),
            Err(ValidationError::Required { .. })
        ));

        let defaulted = AttributeDefinition::new("unit", AttributeType::String)
            .required()
            .with_default("MINUTES");
        assert_eq!(defaulted.validate(ModelValue::Undefined).unwrap(), ModelValue::Undefined);
    }

    #[test]
    fn test_resolve_for_read() {
        let def = max_pool_size();
        assert_eq!(def.resolve_for_read(&ModelValue::Undefined), ModelValue::Int(20));
        assert_eq!(def.resolve_for_read(&ModelValue::Int(3)), ModelValue::Int(3));
        assert_eq!(derive_size().resolve_for_read(&ModelValue::Undefined), ModelValue::Undefined);
    }

    #[test]
    fn test_boolean_and_list_coercion() {
        let flag = AttributeDefinition::new("statistics-enabled", AttributeType::Boolean);
        assert_eq!(flag.validate(ModelValue::from("TRUE")).unwrap(), ModelValue::Boolean(true));
        assert!(flag.validate(ModelValue::Int(1)).is_err());

        let list = AttributeDefinition::new("names", AttributeType::List);
        assert_eq!(
            list.validate(ModelValue::List(vec![ModelValue::Int(1), ModelValue::from("a")]))
                .unwrap(),
            ModelValue::List(vec![ModelValue::from("1"), ModelValue::from("a")])
        );
    }
}
