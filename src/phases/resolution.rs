//! Phase 1: Role Resolution
//!
//! Expands the roles a playbook declares into the full closure of roles it
//! needs, each dependency listed before the role that requires it.
//!
//! A role is expanded only the first time it is reached in a pass. This keeps
//! resolution finite on cyclic meta files: with `x -> y -> x`, resolving `x`
//! yields `[y, x]` and no error. In diamond or cyclic graphs a role's position
//! reflects the first path that reached it.
//!
//! A meta file that cannot be read or parsed does not stop resolution. The
//! role is logged and treated as having no dependencies.

use std::collections::HashSet;

use crate::logging::Logger;
use crate::phases::RoleNode;
use crate::role::RoleCatalog;

/// Roles already visited during one resolution pass.
#[derive(Debug, Default)]
pub struct ResolutionState {
    visited: HashSet<String>,
}

impl ResolutionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visited(&self, role: &str) -> bool {
        self.visited.contains(role)
    }

    /// Mark `role` visited. Returns false if it already was.
    fn visit(&mut self, role: &str) -> bool {
        self.visited.insert(role.to_string())
    }
}

/// Resolve one role against a shared resolution state.
///
/// Returns the roles this call newly contributes, dependencies first and
/// `role` last. A role already in `state` contributes nothing.
pub fn resolve(
    role: &str,
    state: &mut ResolutionState,
    catalog: &dyn RoleCatalog,
    logger: &Logger,
) -> Vec<String> {
    if !state.visit(role) {
        return Vec::new();
    }

    let dependencies = match catalog.dependencies(role) {
        Ok(deps) => deps,
        Err(e) => {
            logger.warn(format!(
                "Could not read dependencies of role '{}', assuming none: {}",
                role, e
            ));
            Vec::new()
        }
    };

    let mut order = Vec::new();
    for dependency in &dependencies {
        order.extend(resolve(dependency, state, catalog, logger));
    }
    order.push(role.to_string());
    order
}

/// Resolve the full role closure for a set of directly declared roles.
///
/// All roles share one resolution state; the concatenated result is
/// deduplicated keeping first occurrences.
pub fn resolve_closure(
    direct_roles: &[String],
    catalog: &dyn RoleCatalog,
    logger: &Logger,
) -> Vec<String> {
    let mut state = ResolutionState::new();
    let mut closure = Vec::new();

    for role in direct_roles {
        closure.extend(resolve(role, &mut state, catalog, logger));
    }

    let mut seen = HashSet::new();
    closure.retain(|role| seen.insert(role.clone()));

    logger.debug(format!("Resolved roles: {}", closure.join(", ")));
    closure
}

/// Build the declared dependency tree below each directly declared role.
///
/// Shared dependencies are shown under every role that declares them. A role
/// that already appears on its own path is marked as a cycle and not
/// expanded again.
pub fn dependency_tree(
    direct_roles: &[String],
    catalog: &dyn RoleCatalog,
    logger: &Logger,
) -> Vec<RoleNode> {
    fn build(
        role: &str,
        path: &mut Vec<String>,
        catalog: &dyn RoleCatalog,
        logger: &Logger,
    ) -> RoleNode {
        let mut node = RoleNode::new(role);
        if path.iter().any(|r| r == role) {
            node.cycle = true;
            return node;
        }

        let dependencies = catalog.dependencies(role).unwrap_or_else(|e| {
            logger.warn(format!("Could not read dependencies of role '{}': {}", role, e));
            Vec::new()
        });

        path.push(role.to_string());
        node.children = dependencies
            .iter()
            .map(|dep| build(dep, path, catalog, logger))
            .collect();
        path.pop();
        node
    }

    direct_roles
        .iter()
        .map(|role| build(role, &mut Vec::new(), catalog, logger))
        .collect()
}
