//! Path element and path types.

use crate::value::Value;
use std::fmt;

/// The field name that matches any key or index at its level.
pub const WILDCARD: &str = "*";

/// PathElement represents one level of path navigation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathElement {
    /// Name of an object field or map key.
    FieldName(String),
    /// Index into an array.
    Index(usize),
}

impl PathElement {
    /// Creates a new field name path element.
    pub fn field_name(name: impl Into<String>) -> Self {
        PathElement::FieldName(name.into())
    }

    /// Creates a new index path element.
    pub fn index(i: usize) -> Self {
        PathElement::Index(i)
    }

    /// Returns true if this is a field name element.
    pub fn is_field_name(&self) -> bool {
        matches!(self, PathElement::FieldName(_))
    }

    /// Returns the field name if this is a field name element.
    pub fn as_field_name(&self) -> Option<&str> {
        match self {
            PathElement::FieldName(name) => Some(name),
            _ => None,
        }
    }

    /// Returns true if this element is the `*` wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.as_field_name() == Some(WILDCARD)
    }

    /// Returns true if this element, used as a pattern, selects `other`.
    pub fn matches(&self, other: &PathElement) -> bool {
        self.is_wildcard() || self == other
    }
}

/// Returns true if a field name cannot be written in dotted form.
fn requires_quote(key: &str) -> bool {
    key.is_empty() || key.contains(['.', '"', '[', ']'])
}

/// Writes one path element onto a canonical path string.
pub(crate) fn write_element(buf: &mut String, element: &PathElement) {
    match element {
        PathElement::FieldName(key) if requires_quote(key) => {
            buf.push_str("[\"");
            for c in key.chars() {
                if c == '"' || c == '\\' {
                    buf.push('\\');
                }
                buf.push(c);
            }
            buf.push_str("\"]");
        }
        PathElement::FieldName(key) => {
            if !buf.is_empty() {
                buf.push('.');
            }
            buf.push_str(key);
        }
        PathElement::Index(i) => {
            buf.push('[');
            buf.push_str(&i.to_string());
            buf.push(']');
        }
    }
}

/// PropertyPath addresses a position inside a property tree.
///
/// Its `Display` form is canonical: parsing it back with
/// [`PropertyPath::parse`] yields the same elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyPath {
    elements: Vec<PathElement>,
}

impl PropertyPath {
    /// Creates a new empty (root) path.
    pub fn new() -> Self {
        PropertyPath {
            elements: Vec::new(),
        }
    }

    /// Creates a path from a vector of elements.
    pub fn from_elements(elements: Vec<PathElement>) -> Self {
        PropertyPath { elements }
    }

    /// Returns the number of elements in the path.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if the path is the root.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns an iterator over the path elements.
    pub fn iter(&self) -> impl Iterator<Item = &PathElement> {
        self.elements.iter()
    }

    /// Appends a path element.
    pub fn push(&mut self, element: PathElement) {
        self.elements.push(element);
    }

    /// Removes and returns the last path element.
    pub fn pop(&mut self) -> Option<PathElement> {
        self.elements.pop()
    }

    /// Returns the last path element.
    pub fn last(&self) -> Option<&PathElement> {
        self.elements.last()
    }

    /// Creates a new path with the given element appended.
    pub fn with(&self, element: PathElement) -> Self {
        let mut new_path = self.clone();
        new_path.push(element);
        new_path
    }

    /// Creates a new path addressing the named field below this one.
    pub fn field(&self, name: impl Into<String>) -> Self {
        self.with(PathElement::field_name(name))
    }

    /// Creates a new path addressing the array element below this one.
    pub fn element(&self, index: usize) -> Self {
        self.with(PathElement::index(index))
    }

    /// Returns a slice of the path elements.
    pub fn as_slice(&self) -> &[PathElement] {
        &self.elements
    }

    /// Returns true if this path, used as a pattern, selects exactly `other`.
    /// Wildcard elements match any single element.
    pub fn matches(&self, other: &PropertyPath) -> bool {
        self.len() == other.len()
            && self
                .elements
                .iter()
                .zip(other.elements.iter())
                .all(|(p, o)| p.matches(o))
    }

    /// Returns true if `other` is this path or lies below it. For example
    /// `foo["bar"][1]` contains `foo.bar[1].baz`, and `foo.*` contains
    /// `foo.bar.baz`.
    pub fn contains(&self, other: &PropertyPath) -> bool {
        other.len() >= self.len()
            && self
                .elements
                .iter()
                .zip(other.elements.iter())
                .all(|(p, o)| p.matches(o))
    }

    /// Looks up the value this path addresses inside `root`.
    ///
    /// Wildcards do not select anything here; they are only meaningful as
    /// patterns.
    pub fn get<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;
        for element in &self.elements {
            current = match (element, current) {
                (PathElement::Index(i), Value::List(items)) => items.get(*i)?,
                (PathElement::FieldName(k), Value::Map(map)) => map.get(k)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl FromIterator<PathElement> for PropertyPath {
    fn from_iter<T: IntoIterator<Item = PathElement>>(iter: T) -> Self {
        PropertyPath {
            elements: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for PropertyPath {
    type Item = PathElement;
    type IntoIter = std::vec::IntoIter<PathElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a> IntoIterator for &'a PropertyPath {
    type Item = &'a PathElement;
    type IntoIter = std::slice::Iter<'a, PathElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = String::new();
        for element in &self.elements {
            write_element(&mut buf, element);
        }
        f.write_str(&buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::from_json;

    fn path(elements: Vec<PathElement>) -> PropertyPath {
        PropertyPath::from_elements(elements)
    }

    #[test]
    fn test_path_operations() {
        let mut p = PropertyPath::new();
        assert!(p.is_empty());

        p.push(PathElement::field_name("metadata"));
        p.push(PathElement::field_name("name"));
        assert_eq!(p.len(), 2);
        assert_eq!(p.last(), Some(&PathElement::field_name("name")));

        let popped = p.pop();
        assert_eq!(popped, Some(PathElement::field_name("name")));
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn test_path_display() {
        assert_eq!(PropertyPath::new().to_string(), "");
        assert_eq!(PropertyPath::new().field("metadata").field("name").to_string(), "metadata.name");
        assert_eq!(PropertyPath::new().field("rules").element(3).field("port").to_string(), "rules[3].port");
        assert_eq!(PropertyPath::new().element(0).element(1).to_string(), "[0][1]");
    }

    #[test]
    fn test_path_display_quotes_special_keys() {
        assert_eq!(PropertyPath::new().field("a.b").to_string(), r#"["a.b"]"#);
        assert_eq!(PropertyPath::new().field("tags").field("k8s.io/name").to_string(), r#"tags["k8s.io/name"]"#);
        assert_eq!(PropertyPath::new().field(r#"say "hi""#).to_string(), r#"["say \"hi\""]"#);
        assert_eq!(PropertyPath::new().field("x").field("[0]").to_string(), r#"x["[0]"]"#);
        assert_eq!(PropertyPath::new().field("x").field("").to_string(), r#"x[""]"#);
        // Characters other than . " [ ] stay in dotted form.
        assert_eq!(PropertyPath::new().field("x").field("a-b c").to_string(), "x.a-b c");
    }

    #[test]
    fn test_matches_and_contains() {
        let pattern = path(vec![PathElement::field_name("rules"), PathElement::field_name("*")]);
        let concrete = PropertyPath::new().field("rules").element(2);

        assert!(pattern.matches(&concrete));
        assert!(pattern.contains(&concrete));
        assert!(pattern.contains(&concrete.field("port")));
        assert!(!pattern.matches(&concrete.field("port")));
        assert!(!pattern.contains(&PropertyPath::new().field("rules")));
        assert!(!PropertyPath::new().field("a").matches(&PropertyPath::new().field("b")));
    }

    #[test]
    fn test_get() {
        let tree = from_json(r#"{"a": {"b": [10, {"c": "x"}]}}"#).unwrap();
        let p = PropertyPath::new().field("a").field("b").element(1).field("c");
        assert_eq!(p.get(&tree).and_then(|v| v.as_str()), Some("x"));

        assert!(PropertyPath::new().field("a").element(0).get(&tree).is_none());
        assert!(PropertyPath::new().field("a").field("b").element(5).get(&tree).is_none());
        assert_eq!(PropertyPath::new().get(&tree), Some(&tree));
    }

    #[test]
    fn test_path_element_ordering() {
        let a = PathElement::field_name("a");
        let b = PathElement::field_name("b");
        assert!(a < b);
        // Field names come before indices
        assert!(a < PathElement::index(0));
    }
}
