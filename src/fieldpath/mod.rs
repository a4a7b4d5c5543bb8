//! Field path module - Addresses positions inside property trees.
//!
//! Paths have a canonical string form which is used as the key space of diff
//! results and is compared against user-supplied ignore-changes paths.

mod parse;
mod path;
mod reset;

pub use parse::*;
pub use path::*;

use path::write_element;

/// Returns the canonical path of field `key` of the object at `parent`.
///
/// Keys containing any of `. " [ ]` (and the empty key) are written in
/// bracket-quoted form, e.g. `tags["k8s.io/name"]`.
pub fn object_property_path(parent: &str, key: &str) -> String {
    let mut buf = parent.to_string();
    write_element(&mut buf, &PathElement::field_name(key));
    buf
}

/// Returns the canonical path of element `index` of the array at `parent`.
pub fn list_element_path(parent: &str, index: usize) -> String {
    let mut buf = parent.to_string();
    write_element(&mut buf, &PathElement::index(index));
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_property_path() {
        assert_eq!(object_property_path("", "size"), "size");
        assert_eq!(object_property_path("spec", "size"), "spec.size");
        assert_eq!(object_property_path("", "a.b"), r#"["a.b"]"#);
        assert_eq!(object_property_path("tags", r#"x"y"#), r#"tags["x\"y"]"#);
        assert_eq!(object_property_path("l[0]", "name"), "l[0].name");
    }

    #[test]
    fn test_list_element_path() {
        assert_eq!(list_element_path("", 0), "[0]");
        assert_eq!(list_element_path("L", 2), "L[2]");
        assert_eq!(list_element_path(r#"["a.b"]"#, 1), r#"["a.b"][1]"#);
    }

    #[test]
    fn test_helpers_agree_with_display() {
        let p = PropertyPath::new().field("rules").element(1).field("a.b");
        let built = object_property_path(&list_element_path(&object_property_path("", "rules"), 1), "a.b");
        assert_eq!(built, p.to_string());
    }

    #[test]
    fn test_plain_keys_appear_literally() {
        for key in ["name", "instanceType", "a_b", "x-y"] {
            let p = object_property_path("root", key);
            assert!(p.contains(key));
            assert_eq!(PropertyPath::parse(&p).unwrap().last(), Some(&PathElement::field_name(key)));
        }
    }
}
