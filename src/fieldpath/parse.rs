//! Parsing of user-supplied property path strings.
//!
//! A property path is a property access expression whose elements are all
//! literals:
//!
//! ```text
//! propertyName       := [^.[]+
//! quotedPropertyName := '"' ( '\' '"' | '\' '\' | [^"] )* '"'
//! arrayIndex         := [0-9]+ | '*'
//! propertyIndex      := '[' ( quotedPropertyName | arrayIndex ) ']'
//! rootProperty       := propertyName | propertyIndex
//! propertyAccessor   := '.' propertyName | propertyIndex
//! path               := [ rootProperty { propertyAccessor } ]
//! ```
//!
//! The empty string is the root path.
//!
//! Examples: `root`, `root.nested`, `root["nested"]`, `root.array[0].field`,
//! `root["key with \"quotes\""]`, `["key with a ."][100]`, `root.array[*].field`.

use super::path::{PathElement, PropertyPath, WILDCARD};
use thiserror::Error;

/// PathError describes why a property path string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("expected property path to start with a name or index")]
    LeadingDot,

    #[error("expected property path to end with a name or index")]
    TrailingDot,

    #[error("expected property name after '.'")]
    DotBeforeIndex,

    #[error("missing closing quote in property name")]
    MissingQuote,

    #[error("missing closing bracket in property access")]
    MissingBracket,

    #[error("missing closing bracket in array index")]
    MissingIndexBracket,

    #[error("invalid array index {index:?}")]
    InvalidIndex { index: String },
}

impl PropertyPath {
    /// Parses a property path, tolerating a `.` directly followed by `[`.
    pub fn parse(path: &str) -> Result<PropertyPath, PathError> {
        parse_property_path(path, false)
    }

    /// Parses a property path, rejecting a `.` directly followed by `[`.
    pub fn parse_strict(path: &str) -> Result<PropertyPath, PathError> {
        parse_property_path(path, true)
    }
}

impl std::str::FromStr for PropertyPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyPath::parse(s)
    }
}

fn parse_property_path(path: &str, strict: bool) -> Result<PropertyPath, PathError> {
    if path.starts_with('.') {
        return Err(PathError::LeadingDot);
    }

    let mut elements = Vec::new();
    let mut rest = path;
    while !rest.is_empty() {
        if let Some(after_dot) = rest.strip_prefix('.') {
            rest = after_dot;
            if rest.is_empty() {
                return Err(PathError::TrailingDot);
            }
            if rest.starts_with('[') {
                if strict {
                    return Err(PathError::DotBeforeIndex);
                }
                tracing::trace!(path, "property path contains a '.' followed by a '['");
            }
        } else if let Some(inner) = rest.strip_prefix('[') {
            let (element, remaining) = if let Some(quoted) = inner.strip_prefix('"') {
                parse_quoted(quoted)?
            } else {
                parse_index(inner)?
            };
            elements.push(element);
            rest = remaining;
        } else {
            let end = rest.find(['.', '[']).unwrap_or(rest.len());
            elements.push(PathElement::field_name(&rest[..end]));
            rest = &rest[end..];
        }
    }
    Ok(PropertyPath::from_elements(elements))
}

/// Parses `key"]...` (the text after `["`), returning the element and the
/// remaining input after the closing bracket.
fn parse_quoted(input: &str) -> Result<(PathElement, &str), PathError> {
    let mut key = String::new();
    let mut chars = input.char_indices();
    let close = loop {
        match chars.next() {
            None => return Err(PathError::MissingQuote),
            Some((i, '"')) => break i,
            Some((_, '\\')) => match chars.clone().next() {
                Some((_, c @ ('"' | '\\'))) => {
                    key.push(c);
                    chars.next();
                }
                _ => key.push('\\'),
            },
            Some((_, c)) => key.push(c),
        }
    };
    let remaining = input[close + 1..]
        .strip_prefix(']')
        .ok_or(PathError::MissingBracket)?;
    Ok((PathElement::FieldName(key), remaining))
}

/// Parses `123]...` or `*]...` (the text after `[`).
fn parse_index(input: &str) -> Result<(PathElement, &str), PathError> {
    let close = input.find(']').ok_or(PathError::MissingIndexBracket)?;
    let segment = &input[..close];
    let element = if segment == WILDCARD {
        PathElement::field_name(WILDCARD)
    } else {
        let index = segment.parse::<usize>().map_err(|_| PathError::InvalidIndex {
            index: segment.to_string(),
        })?;
        PathElement::Index(index)
    };
    Ok((element, &input[close + 1..]))
}
