//! Loosely-typed YAML documents
//!
//! Playbooks, role meta files, task files and inventories are all untyped
//! nested mapping/sequence/scalar trees. They are kept as `serde_yaml::Value`
//! and read through the accessors here, which never fail on a shape mismatch:
//! a missing key and a key of the wrong type both read as `None`.
//!
//! `deep_clone` is the one way a document subtree gets copied before being
//! rewritten. It walks the tree explicitly so a copy can never fail halfway.

use std::fs;
use std::path::Path;

use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};

/// Read and parse a YAML document from disk.
///
/// A missing file is reported as `Error::NotFound`, unparsable content as
/// `Error::Parse`. An empty file parses to `Value::Null`.
pub fn load(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::not_found("document", path.display())
        } else {
            Error::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            }
        }
    })?;
    parse(&content, &path.display().to_string())
}

/// Parse YAML text; `origin` names the source in error messages.
pub fn parse(content: &str, origin: &str) -> Result<Value> {
    serde_yaml::from_str(content).map_err(|e| Error::Parse {
        path: origin.to_string(),
        message: e.to_string(),
    })
}

/// Serialize a document back to YAML text.
pub fn to_string(value: &Value) -> Result<String> {
    Ok(serde_yaml::to_string(value)?)
}

/// Look up `key` in a mapping value as a string.
pub fn get_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// Look up `key` in a mapping value as a mapping.
pub fn get_mapping<'a>(value: &'a Value, key: &str) -> Option<&'a Mapping> {
    value.get(key).and_then(Value::as_mapping)
}

/// Look up `key` in a mapping value as a sequence.
pub fn get_sequence<'a>(value: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    value.get(key).and_then(Value::as_sequence)
}

/// Check whether a sequence holds the string `needle`.
pub fn contains_str(seq: &[Value], needle: &str) -> bool {
    seq.iter().any(|item| item.as_str() == Some(needle))
}

/// Recursively copy a document subtree into freshly built nodes.
pub fn deep_clone(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Bool(b) => Value::Bool(*b),
        Value::Number(n) => Value::Number(n.clone()),
        Value::String(s) => Value::String(s.clone()),
        Value::Sequence(seq) => Value::Sequence(seq.iter().map(deep_clone).collect()),
        Value::Mapping(map) => Value::Mapping(clone_mapping(map)),
        Value::Tagged(tagged) => Value::Tagged(Box::new(TaggedValue {
            tag: tagged.tag.clone(),
            value: deep_clone(&tagged.value),
        })),
    }
}

/// Mapping flavour of [`deep_clone`], preserving key order.
pub fn clone_mapping(map: &Mapping) -> Mapping {
    map.iter()
        .map(|(k, v)| (deep_clone(k), deep_clone(v)))
        .collect()
}

/// Get a human-readable type name for a YAML value
///
/// Used for logging and error messages to describe the type of a value.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "Null",
        Value::Bool(_) => "Bool",
        Value::Number(_) => "Number",
        Value::String(_) => "String",
        Value::Sequence(_) => "Sequence",
        Value::Mapping(_) => "Mapping",
        Value::Tagged(_) => "Tagged",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn test_accessors_tolerate_shape_mismatch() {
        let doc = yaml("name: web\nroles: nginx\ntags: [a, b]\nvars: {x: 1}");

        assert_eq!(get_str(&doc, "name"), Some("web"));
        assert_eq!(get_str(&doc, "missing"), None);
        assert!(get_sequence(&doc, "roles").is_none());
        assert_eq!(get_sequence(&doc, "tags").map(|s| s.len()), Some(2));
        assert!(get_mapping(&doc, "vars").is_some());
        assert!(get_mapping(&doc, "tags").is_none());

        // Accessors on a non-mapping never panic
        let scalar = yaml("42");
        assert_eq!(get_str(&scalar, "name"), None);
        assert!(get_sequence(&Value::Null, "roles").is_none());
    }

    #[test]
    fn test_contains_str() {
        let doc = yaml("[a, 1, b]");
        let seq = doc.as_sequence().unwrap();
        assert!(contains_str(seq, "a"));
        assert!(contains_str(seq, "b"));
        assert!(!contains_str(seq, "1"));
    }

    #[test]
    fn test_deep_clone_is_independent_and_equal() {
        let original = yaml(
            r#"
template:
  src: app.conf.j2
  dest: /etc/app/app.conf
notify: [restart]
secret: !vault |
  $ANSIBLE_VAULT;1.1;AES256
  6162
"#,
        );
        let mut copy = deep_clone(&original);
        assert_eq!(copy, original);

        copy.as_mapping_mut()
            .unwrap()
            .insert(Value::from("run_once"), Value::from(true));
        assert_ne!(copy, original);
        assert!(original.get("run_once").is_none());
    }

    #[test]
    fn test_clone_mapping_preserves_order() {
        let doc = yaml("z: 1\na: 2\nm: 3");
        let cloned = clone_mapping(doc.as_mapping().unwrap());
        let keys: Vec<&str> = cloned.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_type_name() {
        assert_eq!(type_name(&Value::Null), "Null");
        assert_eq!(type_name(&yaml("[1]")), "Sequence");
        assert_eq!(type_name(&yaml("{a: 1}")), "Mapping");
        assert_eq!(type_name(&yaml("text")), "String");
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        let err = load(&temp.path().join("nope.yml")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_load_malformed_file_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.yml");
        fs::write(&path, "key: [unclosed").unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_load_empty_file_is_null() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty.yml");
        fs::write(&path, "").unwrap();
        assert_eq!(load(&path).unwrap(), Value::Null);
    }
}
