// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Address Value Objects
//!
//! A [`ResourceAddress`] is an ordered sequence of [`PathElement`]s starting at
//! the model root. Addresses are immutable: [`ResourceAddress::append`] returns
//! a new address and never touches the receiver.
//!
//! # Text Form
//!
//! ```text
//! /subsystem=ejb3/strict-max-bean-instance-pool=slsb-strict-max-pool
//! ```
//!
//! The empty address (the root) renders as `/`.

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Address validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Address element key is empty")]
    EmptyKey,

    #[error("Address element value is empty for key '{0}'")]
    EmptyValue(String),

    #[error("Invalid character '{ch}' in address element '{element}'")]
    InvalidCharacter { element: String, ch: char },

    #[error("Malformed address segment: {0}")]
    MalformedSegment(String),
}

/// One `(type, name)` step of a resource address
///
/// The name may be the wildcard `*`, which is only meaningful for
/// registration paths in the schema registry, never for live resources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathElement {
    key: String,
    value: String,
}

impl PathElement {
    /// Wildcard element value
    pub const WILDCARD: &'static str = "*";

    /// Create a validated path element
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Result<Self, AddressError> {
        let key = key.into();
        let value = value.into();

        if key.is_empty() {
            return Err(AddressError::EmptyKey);
        }
        if value.is_empty() {
            return Err(AddressError::EmptyValue(key));
        }
        for part in [&key, &value] {
            if let Some(ch) = part.chars().find(|c| matches!(c, '/' | '=' | ',')) {
                return Err(AddressError::InvalidCharacter {
                    element: part.clone(),
                    ch,
                });
            }
        }

        Ok(Self { key, value })
    }

    /// Create a wildcard element for registration paths
    pub fn wildcard(key: impl Into<String>) -> Result<Self, AddressError> {
        Self::new(key, Self::WILDCARD)
    }

    /// Resource type segment (e.g. `subsystem`)
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Resource instance name (e.g. `ejb3`)
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_wildcard(&self) -> bool {
        self.value == Self::WILDCARD
    }

    /// Whether a registration element matches a concrete element
    pub fn matches(&self, other: &PathElement) -> bool {
        self.key == other.key && (self.is_wildcard() || self.value == other.value)
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Immutable address of a node in the resource tree
///
/// On the wire an address is a list of single-entry objects
/// (`[{"subsystem": "ejb3"}]`); the text form is accepted as well.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceAddress(Vec<PathElement>);

impl ResourceAddress {
    /// The root address
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build an address from `(type, name)` pairs
    pub fn from_pairs<K, V, I>(pairs: I) -> Result<Self, AddressError>
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        pairs
            .into_iter()
            .map(|(k, v)| PathElement::new(k, v))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Parse the `/key=value/key=value` text form
    pub fn parse(text: &str) -> Result<Self, AddressError> {
        let trimmed = text.trim().trim_start_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        trimmed
            .split('/')
            .map(|segment| {
                let (key, value) = segment
                    .split_once('=')
                    .ok_or_else(|| AddressError::MalformedSegment(segment.to_string()))?;
                PathElement::new(key, value)
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Return a new address with `element` appended
    pub fn append(&self, element: PathElement) -> Self {
        let mut elements = self.0.clone();
        elements.push(element);
        Self(elements)
    }

    /// Convenience wrapper around [`append`](Self::append)
    pub fn child(&self, key: &str, value: &str) -> Result<Self, AddressError> {
        Ok(self.append(PathElement::new(key, value)?))
    }

    /// Parent address, `None` for the root
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    pub fn last(&self) -> Option<&PathElement> {
        self.0.last()
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Value of the first element with the given key
    ///
    /// Used to find which subsystem an address belongs to.
    pub fn value_of(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|e| e.key() == key).map(PathElement::value)
    }

    /// Whether `self` is `other` or one of its descendants
    pub fn starts_with(&self, other: &ResourceAddress) -> bool {
        self.0.len() >= other.0.len() && self.0[..other.0.len()] == other.0[..]
    }
}

impl fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for element in &self.0 {
            write!(f, "/{}", element)?;
        }
        Ok(())
    }
}

impl Serialize for ResourceAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for element in &self.0 {
            let mut entry = IndexMap::with_capacity(1);
            entry.insert(element.key(), element.value());
            seq.serialize_element(&entry)?;
        }
        seq.end()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AddressRepr {
    Text(String),
    Elements(Vec<IndexMap<String, String>>),
}

impl<'de> Deserialize<'de> for ResourceAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match AddressRepr::deserialize(deserializer)? {
            AddressRepr::Text(text) => Self::parse(&text).map_err(D::Error::custom),
            AddressRepr::Elements(entries) => entries
                .into_iter()
                .map(|entry| {
                    if entry.len() != 1 {
                        return Err(D::Error::custom(
                            "address entries must hold exactly one type/name pair",
                        ));
                    }
                    let (key, value) = entry.into_iter().next().ok_or_else(|| {
                        D::Error::custom("address entries must hold exactly one type/name pair")
                    })?;
                    PathElement::new(key, value).map_err(D::Error::custom)
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self),
        }
    }
}

impl From<Vec<PathElement>> for ResourceAddress {
    fn from(elements: Vec<PathElement>) -> Self {
        Self(elements)
    }
}
