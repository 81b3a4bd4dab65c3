//! Reading playbooks and the roles their plays declare

use std::collections::HashSet;
use std::path::Path;

use serde_yaml::Value;

use crate::document;
use crate::error::{Error, Result};
use crate::role::RoleRef;

/// Load a playbook as its list of plays.
///
/// An empty file is an empty playbook. Any top-level shape other than a
/// sequence is a parse error.
pub fn load(path: &Path) -> Result<Vec<Value>> {
    match document::load(path)? {
        Value::Sequence(plays) => Ok(plays),
        Value::Null => Ok(Vec::new()),
        other => Err(Error::Parse {
            path: path.display().to_string(),
            message: format!(
                "a playbook must be a sequence of plays, found {}",
                document::type_name(&other)
            ),
        }),
    }
}

/// Collect the roles declared directly by the plays of a playbook.
///
/// Plays without a `roles` sequence are skipped, as are entries that do not
/// name a role. Names are deduplicated across all plays, keeping the order in
/// which they first appear.
pub fn extract_roles(plays: &[Value]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut roles = Vec::new();

    for play in plays {
        let Some(entries) = document::get_sequence(play, "roles") else {
            continue;
        };

        for entry in entries {
            if let RoleRef::Name(name) = RoleRef::from_value(entry) {
                if seen.insert(name.clone()) {
                    roles.push(name);
                }
            }
        }
    }

    roles
}
