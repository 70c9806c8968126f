// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cross-Attribute Constraints - Pure Validation Functions
//!
//! Constraints are predicates over the *full* attribute set of one resource.
//! They are always evaluated against the prospective attribute map (the stored
//! map with a pending change substituted), never against a single field, so
//! the order in which attributes are written cannot bypass them.
//!
//! # Constraint Kinds
//!
//! - [`Constraint::Alternatives`]: at most one of the listed attributes may be
//!   defined (e.g. `max-pool-size` / `derive-size`)
//! - [`Constraint::Requires`]: if an attribute is defined, the listed
//!   attributes must be defined as well
//!
//! All functions are pure: no I/O, no mutation, deterministic.

use indexmap::IndexMap;

use crate::domain::ModelValue;

/// Result of a constraint check
pub type ConstraintResult = Result<(), ConstraintViolation>;

/// Cross-attribute constraint violation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ConstraintViolation {
    /// Human readable description naming the conflicting attributes
    pub message: String,

    /// Attributes involved in the conflict
    pub attributes: Vec<String>,
}

impl ConstraintViolation {
    pub fn new(message: impl Into<String>, attributes: Vec<String>) -> Self {
        Self {
            message: message.into(),
            attributes,
        }
    }
}

/// Predicate over the sibling attributes of one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// At most one of these attributes may be defined
    Alternatives(Vec<String>),

    /// When `attribute` is defined, every attribute in `requires` must be too
    Requires {
        attribute: String,
        requires: Vec<String>,
    },
}

impl Constraint {
    pub fn alternatives<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Constraint::Alternatives(attributes.into_iter().map(Into::into).collect())
    }

    pub fn requires<I, S>(attribute: impl Into<String>, requires: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Constraint::Requires {
            attribute: attribute.into(),
            requires: requires.into_iter().map(Into::into).collect(),
        }
    }

    /// Attribute names this constraint mentions
    pub fn attributes(&self) -> Vec<&str> {
        match self {
            Constraint::Alternatives(names) => names.iter().map(String::as_str).collect(),
            Constraint::Requires {
                attribute,
                requires,
            } => std::iter::once(attribute.as_str())
                .chain(requires.iter().map(String::as_str))
                .collect(),
        }
    }

    /// Evaluate the constraint against a full attribute map
    pub fn check(&self, attributes: &IndexMap<String, ModelValue>) -> ConstraintResult {
        match self {
            Constraint::Alternatives(names) => check_alternatives(names, attributes),
            Constraint::Requires {
                attribute,
                requires,
            } => check_requires(attribute, requires, attributes),
        }
    }
}

fn is_defined(attributes: &IndexMap<String, ModelValue>, name: &str) -> bool {
    attributes.get(name).is_some_and(ModelValue::is_defined)
}

/// Validate that at most one alternative is defined
///
/// # Rules
/// - Zero or one defined alternative is fine
/// - Two or more defined alternatives name every defined one in the message
pub fn check_alternatives(
    names: &[String],
    attributes: &IndexMap<String, ModelValue>,
) -> ConstraintResult {
    let defined: Vec<String> = names
        .iter()
        .filter(|name| is_defined(attributes, name))
        .cloned()
        .collect();

    if defined.len() > 1 {
        let (first, rest) = defined.split_at(1);
        return Err(ConstraintViolation::new(
            format!(
                "Attribute '{}' is invalid in combination with '{}'",
                first[0],
                rest.join("', '")
            ),
            defined,
        ));
    }
    Ok(())
}

/// Validate that a defined attribute has all of its required siblings
pub fn check_requires(
    attribute: &str,
    requires: &[String],
    attributes: &IndexMap<String, ModelValue>,
) -> ConstraintResult {
    if !is_defined(attributes, attribute) {
        return Ok(());
    }

    let missing: Vec<String> = requires
        .iter()
        .filter(|name| !is_defined(attributes, name))
        .cloned()
        .collect();

    if !missing.is_empty() {
        let mut involved = vec![attribute.to_string()];
        involved.extend(missing.iter().cloned());
        return Err(ConstraintViolation::new(
            format!(
                "Attribute '{}' requires '{}' to be defined",
                attribute,
                missing.join("', '")
            ),
            involved,
        ));
    }
    Ok(())
}

/// Evaluate every constraint, stopping at the first violation
pub fn check_constraints(
    constraints: &[Constraint],
    attributes: &IndexMap<String, ModelValue>,
) -> ConstraintResult {
    constraints
        .iter()
        .try_for_each(|constraint| constraint.check(attributes))
}
