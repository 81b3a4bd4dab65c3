//! Roles and their declared dependencies
//!
//! A role is known by its directory name. Its `meta/main.yml` may list other
//! roles under `dependencies`, using any of the shapes a play's `roles:` list
//! accepts. The `RoleCatalog` trait is the seam between the dependency
//! resolver and wherever role metadata actually lives.

use serde_yaml::Value;

use crate::document;
use crate::error::Result;
use crate::project::Project;

/// A reference to a role as written in a play or a dependency list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRef {
    /// A usable role name.
    Name(String),
    /// Any other shape; ignored by callers.
    Unrecognized,
}

impl RoleRef {
    /// Interpret one list entry.
    ///
    /// Accepts a plain string, a mapping with a string `role` key, or a
    /// mapping with a string `name` key, checked in that order. Empty names
    /// are treated as unrecognized.
    pub fn from_value(entry: &Value) -> Self {
        let name = match entry {
            Value::String(s) => Some(s.as_str()),
            Value::Mapping(_) => {
                document::get_str(entry, "role").or_else(|| document::get_str(entry, "name"))
            }
            _ => None,
        };

        match name {
            Some(name) if !name.trim().is_empty() => RoleRef::Name(name.to_string()),
            _ => RoleRef::Unrecognized,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            RoleRef::Name(name) => Some(name),
            RoleRef::Unrecognized => None,
        }
    }
}

/// Extract dependency names from a parsed meta document.
///
/// A missing or non-sequence `dependencies` field means no dependencies.
/// Unrecognized entries are skipped.
pub fn dependencies_from_meta(meta: &Value) -> Vec<String> {
    document::get_sequence(meta, "dependencies")
        .map(|deps| {
            deps.iter()
                .filter_map(|dep| RoleRef::from_value(dep).name().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Source of role metadata for the dependency resolver.
pub trait RoleCatalog {
    /// Declared dependencies of `role`, in declaration order.
    ///
    /// A role without a meta document has no dependencies and returns
    /// `Ok(vec![])`. Errors are reserved for meta documents that exist but
    /// cannot be read or parsed, and for roles that do not exist at all.
    fn dependencies(&self, role: &str) -> Result<Vec<String>>;
}

impl RoleCatalog for Project {
    fn dependencies(&self, role: &str) -> Result<Vec<String>> {
        match self.find_role_meta(role)? {
            Some(meta_path) => {
                let meta = document::load(&meta_path)?;
                Ok(dependencies_from_meta(&meta))
            }
            None => Ok(Vec::new()),
        }
    }
}
