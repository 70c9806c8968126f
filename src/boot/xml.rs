// Copyright (c) 2025 - Cowboy AI, Inc.
//! Minimal element tree read from a boot document
//!
//! Only element names, attributes and nesting matter for boot; text content,
//! comments and processing instructions are skipped.

use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::BootError;

/// One XML element with its attributes in document order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedElement {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<ParsedElement>,
}

impl ParsedElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Parse a document into its root element
pub fn parse_document(xml: &str) -> Result<ParsedElement, BootError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<ParsedElement> = Vec::new();
    let mut root: Option<ParsedElement> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| BootError::Malformed(format!("at byte {}: {}", reader.buffer_position(), e)))?;

        match event {
            Event::Start(start) => {
                check_single_root(&root, &stack)?;
                stack.push(element_from(&start)?);
            }
            Event::Empty(start) => {
                check_single_root(&root, &stack)?;
                let element = element_from(&start)?;
                close(element, &mut stack, &mut root);
            }
            Event::End(_) => {
                // quick-xml already rejects mismatched end tags
                let element = stack
                    .pop()
                    .ok_or_else(|| BootError::Malformed("unexpected closing tag".to_string()))?;
                close(element, &mut stack, &mut root);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(BootError::Malformed("unexpected end of document".to_string()));
    }
    root.ok_or_else(|| BootError::Malformed("document has no root element".to_string()))
}

fn check_single_root(root: &Option<ParsedElement>, stack: &[ParsedElement]) -> Result<(), BootError> {
    if root.is_some() && stack.is_empty() {
        return Err(BootError::Malformed("document has more than one root element".to_string()));
    }
    Ok(())
}

fn close(element: ParsedElement, stack: &mut [ParsedElement], root: &mut Option<ParsedElement>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

fn element_from(start: &BytesStart<'_>) -> Result<ParsedElement, BootError> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut attributes = IndexMap::new();

    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| BootError::Malformed(format!("<{}>: {}", name, e)))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| BootError::Malformed(format!("<{}> attribute '{}': {}", name, key, e)))?
            .into_owned();
        if attributes.insert(key.clone(), value).is_some() {
            return Err(BootError::Malformed(format!("<{}> repeats attribute '{}'", name, key)));
        }
    }

    Ok(ParsedElement {
        name,
        attributes,
        children: Vec::new(),
    })
}
