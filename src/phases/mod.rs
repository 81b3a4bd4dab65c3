//! The render pipeline, one module per phase.
//!
//! ## Overview
//!
//! Preparing a playbook goes through these phases:
//! 1. Resolution - Expand the playbook's roles to their full dependency closure
//! 2. Staging - Create the workspace and copy the playbook, vars and roles into it
//! 3. Rewrite - Rewrite role task files so only template tasks run, locally
//! 4. Localize - Produce an inventory that forces every host onto a local connection
//! 5. Execute - Hand the workspace to `ansible-playbook`, restricted to the render tag
//!
//! `orchestrator` runs them in order for each configured playbook. Every phase
//! receives the `Logger` of the playbook it works on.

use std::path::{Path, PathBuf};

use crate::defaults::ENGINE_CONFIG_FILE;

// Phase modules
pub mod execute;
pub mod localize;
pub mod orchestrator;
pub mod resolution;
pub mod rewrite;
pub mod staging;

pub use execute as phase5;
pub use localize as phase4;
pub use resolution as phase1;
pub use rewrite as phase3;
pub use staging as phase2;

/// The isolated directory one playbook is prepared in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Role search path handed to the engine.
    pub fn roles_dir(&self) -> PathBuf {
        self.root.join("roles")
    }

    /// Default destination for rendered files.
    pub fn output_dir(&self) -> PathBuf {
        self.root.join("output")
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(ENGINE_CONFIG_FILE)
    }

    /// Ansible's local temp directory, kept inside the workspace.
    pub fn local_tmp(&self) -> PathBuf {
        self.root.join("ansible-tmp")
    }

    /// True if `path` lies inside this workspace.
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
    }
}

/// A playbook whose workspace is fully prepared and ready for the engine.
#[derive(Debug, Clone)]
pub struct PreparedPlaybook {
    /// Name as given in the configuration.
    pub name: String,
    /// Playbook file name inside the workspace.
    pub playbook_file: String,
    /// Resolved role closure, dependencies first.
    pub roles: Vec<String>,
    /// Whether any role contained at least one template task.
    pub has_templates: bool,
    /// Localized inventory artifact.
    pub inventory: PathBuf,
    pub workspace: Workspace,
}

/// Outcome of one playbook run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub playbook: String,
    pub roles: Vec<String>,
    pub has_templates: bool,
    pub workspace: PathBuf,
    pub output_dir: PathBuf,
    /// True if `ansible-playbook` actually ran.
    pub executed: bool,
    /// True if the workspace was removed afterwards.
    pub cleaned_up: bool,
    /// Manual command line, filled in when the engine was not run.
    pub manual_command: Option<String>,
}

/// A node of the declared role dependency tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleNode {
    pub name: String,
    /// Dependencies as declared in the role's meta file.
    pub children: Vec<RoleNode>,
    /// Set when the role already appears on the path from the root.
    pub cycle: bool,
}

impl RoleNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            cycle: false,
        }
    }
}
