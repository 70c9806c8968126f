// Copyright (c) 2025 - Cowboy AI, Inc.
//! Expression Detection and Resolution
//!
//! Expressions have the form `${name}` or `${name:default}`. Names starting
//! with `env.` read process environment variables when the resolver allows it.
//! Several names may be given as comma-separated alternatives: the first one
//! that resolves wins.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

use super::value::ValueError;

static EXPRESSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}:]+)(?::([^}]*))?\}").expect("valid expression pattern"));

/// Whether the text contains at least one `${...}` expression
pub fn is_expression(text: &str) -> bool {
    EXPRESSION.is_match(text)
}

/// Resolves expressions against a property map
#[derive(Debug, Clone, Default)]
pub struct ExpressionResolver {
    properties: HashMap<String, String>,
    allow_environment: bool,
}

impl ExpressionResolver {
    pub fn new(properties: HashMap<String, String>, allow_environment: bool) -> Self {
        Self {
            properties,
            allow_environment,
        }
    }

    /// Resolve every expression in `text`
    pub fn resolve(&self, text: &str) -> Result<String, ValueError> {
        let mut unresolved = None;

        let resolved = EXPRESSION.replace_all(text, |caps: &Captures<'_>| {
            let names = &caps[1];
            let found = names.split(',').map(str::trim).find_map(|name| self.lookup(name));
            match (found, caps.get(2)) {
                (Some(value), _) => value,
                (None, Some(default)) => default.as_str().to_string(),
                (None, None) => {
                    unresolved.get_or_insert_with(|| caps[0].to_string());
                    String::new()
                }
            }
        });

        match unresolved {
            Some(expression) => Err(ValueError::UnresolvedExpression(expression)),
            None => Ok(resolved.into_owned()),
        }
    }

    fn lookup(&self, name: &str) -> Option<String> {
        if let Some(value) = self.properties.get(name) {
            return Some(value.clone());
        }
        match name.strip_prefix("env.") {
            Some(var) if self.allow_environment => std::env::var(var).ok(),
            _ => None,
        }
    }
}
