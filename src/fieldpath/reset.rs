//! Resetting a location in one property tree to its value in another.

use super::path::{PathElement, PropertyPath, WILDCARD};
use crate::value::Value;

impl PropertyPath {
    /// Resets the location this path addresses inside `new` to its value in
    /// `old`.
    ///
    /// A location present in `old` is copied into `new`; a location absent
    /// from `old` is deleted from `new`. Intermediate containers are never
    /// created, and array elements are never created or deleted, so that the
    /// length of an array does not change. `*` applies the reset to every key
    /// or element at its level.
    ///
    /// Returns false if the path cannot be followed through both trees, for
    /// example when it indexes through a scalar or when a parent container is
    /// present in `old` but missing from `new`.
    pub fn reset(&self, old: &Value, new: &mut Value) -> bool {
        reset_at(self.as_slice(), old, new)
    }
}

static NULL: Value = Value::Null;

fn reset_at(path: &[PathElement], old: &Value, new: &mut Value) -> bool {
    let Some((key, rest)) = path.split_first() else {
        return false;
    };

    match key {
        PathElement::Index(i) => reset_index(*i, rest, old, new),
        PathElement::FieldName(k) if k == WILDCARD => reset_wildcard(rest, old, new),
        PathElement::FieldName(k) => reset_field(k, rest, old, new),
    }
}

fn reset_index(i: usize, rest: &[PathElement], old: &Value, new: &mut Value) -> bool {
    match (old, new) {
        (Value::List(o), Value::List(n)) => {
            if rest.is_empty() {
                // Absent on both sides is already the same.
                if i >= o.len() && i >= n.len() {
                    return true;
                }
                if i >= o.len() || i >= n.len() {
                    return false;
                }
                n[i] = o[i].clone();
                return true;
            }
            match (o.get(i), n.get_mut(i)) {
                (Some(ov), Some(nv)) => reset_at(rest, ov, nv),
                _ => false,
            }
        }
        // Neither side is an array: there is nothing at this index to reset.
        (o, n) => !o.is_list() && !n.is_list(),
    }
}

fn reset_field(key: &str, rest: &[PathElement], old: &Value, new: &mut Value) -> bool {
    if rest.is_empty() {
        return match old.as_map().and_then(|m| m.get(key)) {
            Some(v) => match new.as_map_mut() {
                Some(n) => {
                    n.set(key, v.clone());
                    true
                }
                None => false,
            },
            None => {
                if let Some(n) = new.as_map_mut() {
                    n.delete(key);
                }
                true
            }
        };
    }

    match (old, new) {
        (Value::Map(o), Value::Map(n)) => match (o.get(key), n.get_mut(key)) {
            (Some(ov), Some(nv)) => reset_at(rest, ov, nv),
            (None, Some(nv)) => reset_at(rest, &NULL, nv),
            (Some(_), None) => false,
            (None, None) => true,
        },
        (o, n) => !o.is_map() && !n.is_map(),
    }
}

fn reset_wildcard(rest: &[PathElement], old: &Value, new: &mut Value) -> bool {
    if rest.is_empty() {
        return match new {
            Value::Map(n) => {
                if let Value::Map(o) = old {
                    n.fields.clone_from(&o.fields);
                }
                true
            }
            Value::List(n) => match old {
                Value::List(o) if o.len() != n.len() => false,
                Value::List(o) => {
                    n.clone_from(o);
                    true
                }
                _ => true,
            },
            _ => false,
        };
    }

    match (old, new) {
        (Value::Map(o), Value::Map(n)) => o.iter().all(|(k, ov)| match n.get_mut(k) {
            Some(nv) => reset_at(rest, ov, nv),
            None => false,
        }),
        (Value::List(o), Value::List(n)) => {
            o.len() == n.len() && o.iter().zip(n.iter_mut()).all(|(ov, nv)| reset_at(rest, ov, nv))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{from_json, Value};
    use pretty_assertions::assert_eq;

    fn json(s: &str) -> Value {
        from_json(s).unwrap()
    }

    fn reset(path: &str, old: &str, new: &str) -> Option<Value> {
        let mut new = json(new);
        PropertyPath::parse(path)
            .unwrap()
            .reset(&json(old), &mut new)
            .then_some(new)
    }

    #[test]
    fn test_reset_pins_existing_value() {
        assert_eq!(reset("a", r#"{"a":1}"#, r#"{"a":2}"#), Some(json(r#"{"a":1}"#)));
        assert_eq!(
            reset("b.c", r#"{"b":{"c":"foo"}}"#, r#"{"b":{"c":"bar","d":1}}"#),
            Some(json(r#"{"b":{"c":"foo","d":1}}"#))
        );
    }

    #[test]
    fn test_reset_restores_and_removes() {
        assert_eq!(reset("a", r#"{"a":1}"#, r#"{}"#), Some(json(r#"{"a":1}"#)));
        assert_eq!(reset("a", r#"{}"#, r#"{"a":1}"#), Some(json(r#"{}"#)));
        assert_eq!(reset("a", r#"{}"#, r#"{}"#), Some(json(r#"{}"#)));
        assert_eq!(reset("x.y", r#"{}"#, r#"{"x":{"y":1,"z":2}}"#), Some(json(r#"{"x":{"z":2}}"#)));
    }

    #[test]
    fn test_reset_array_elements() {
        assert_eq!(reset("b[1]", r#"{"b":["foo","bar"]}"#, r#"{"b":["foo","baz"]}"#), Some(json(r#"{"b":["foo","bar"]}"#)));
        assert_eq!(reset("b[3]", r#"{"b":[1,2]}"#, r#"{"b":[1]}"#), Some(json(r#"{"b":[1]}"#)));
        // An index present on only one side would change the array length.
        assert_eq!(reset("qux[0]", r#"{"qux":["zed"]}"#, r#"{"qux":[]}"#), None);
        assert_eq!(reset("qux[1]", r#"{"qux":["zed"]}"#, r#"{"qux":["zed","zob"]}"#), None);
    }

    #[test]
    fn test_reset_missing_parent_fails() {
        assert_eq!(reset("foo.bar", r#"{"foo":{"bar":"baz"}}"#, r#"{}"#), None);
        assert_eq!(reset("qux[0]", r#"{"qux":["zed"]}"#, r#"{}"#), None);
        assert_eq!(reset("a.b", r#"{"a":{"b":1}}"#, r#"{"a":7}"#), None);
    }

    #[test]
    fn test_reset_through_scalars_on_both_sides() {
        assert_eq!(reset("a.b", r#"{"a":1}"#, r#"{"a":2}"#), Some(json(r#"{"a":2}"#)));
        assert_eq!(reset("a[0]", r#"{"a":"x"}"#, r#"{"a":"y"}"#), Some(json(r#"{"a":"y"}"#)));
    }

    #[test]
    fn test_reset_wildcards() {
        assert_eq!(reset("b[*]", r#"{"b":["foo","bar"]}"#, r#"{"b":["foo","baz"]}"#), Some(json(r#"{"b":["foo","bar"]}"#)));
        assert_eq!(reset("b[*]", r#"{"b":[1]}"#, r#"{"b":[1,2]}"#), None);
        assert_eq!(reset("m.*", r#"{"m":{"a":1,"b":2}}"#, r#"{"m":{"a":3,"c":4}}"#), Some(json(r#"{"m":{"a":1,"b":2}}"#)));
        assert_eq!(
            reset("rules[*].port", r#"{"rules":[{"port":80},{"port":443}]}"#, r#"{"rules":[{"port":81},{"port":8443}]}"#),
            Some(json(r#"{"rules":[{"port":80},{"port":443}]}"#))
        );
        assert_eq!(reset("m.*.x", r#"{"m":{"a":{"x":1}}}"#, r#"{"m":{}}"#), None);
    }

    #[test]
    fn test_reset_root_path_fails() {
        let mut new = json(r#"{"a":1}"#);
        assert!(!PropertyPath::new().reset(&json("{}"), &mut new));
    }
}
