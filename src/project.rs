//! Locating things inside an Ansible project
//!
//! A `Project` is the source tree the tool reads from: playbooks at its root,
//! roles under `roles/<name>`, and optional `group_vars`/`host_vars`
//! directories. Nothing here writes to the project.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Paths to the variable directories that travel with a playbook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarsDirectories {
    pub group_vars: Option<PathBuf>,
    pub host_vars: Option<PathBuf>,
}

/// A source Ansible project rooted at a directory.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find a playbook by name: `<name>.yml`, then `<name>.yaml`.
    ///
    /// A name that already points at an existing file is used as-is.
    pub fn find_playbook(&self, name: &str) -> Result<PathBuf> {
        let candidates = [
            self.root.join(name),
            self.root.join(format!("{}.yml", name)),
            self.root.join(format!("{}.yaml", name)),
        ];

        candidates
            .into_iter()
            .find(|path| path.is_file())
            .ok_or_else(|| Error::not_found("playbook", name))
    }

    /// Resolve an inventory locator to an existing file or directory.
    pub fn find_inventory(&self, locator: &str) -> Result<PathBuf> {
        let path = self.root.join(locator);
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::not_found("inventory", locator))
        }
    }

    pub fn role_dir(&self, role: &str) -> PathBuf {
        self.root.join("roles").join(role)
    }

    /// Find `meta/main.yml` (or `.yaml`) for a role.
    ///
    /// Returns `Ok(None)` when the role exists but has no meta file, and
    /// `NotFound` when the role directory itself is missing.
    pub fn find_role_meta(&self, role: &str) -> Result<Option<PathBuf>> {
        let role_dir = self.role_dir(role);
        if !role_dir.is_dir() {
            return Err(Error::not_found("role directory", role_dir.display()));
        }

        let meta_dir = role_dir.join("meta");
        Ok(["main.yml", "main.yaml"]
            .iter()
            .map(|name| meta_dir.join(name))
            .find(|path| path.is_file()))
    }

    /// List every YAML file under a role's `tasks/` directory, sorted by path.
    pub fn find_role_task_files(&self, role: &str) -> Result<Vec<PathBuf>> {
        let tasks_dir = self.role_dir(role).join("tasks");
        if !tasks_dir.is_dir() {
            return Err(Error::not_found("role tasks directory", tasks_dir.display()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&tasks_dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                Error::internal(format!("walking {}: {}", tasks_dir.display(), e))
            })?;
            if entry.file_type().is_file() && is_yaml_file(entry.path()) {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Search for `group_vars` and `host_vars`.
    ///
    /// The project root is checked first, then the playbook's directory, then
    /// the inventory's directory. The first hit wins for each kind.
    pub fn find_vars_dirs(&self, playbook: &Path, inventory: &Path) -> VarsDirectories {
        // A directory inventory keeps its vars inside itself
        let inventory_dir = if inventory.is_dir() {
            Some(inventory)
        } else {
            inventory.parent()
        };

        let mut locations = vec![self.root.clone()];
        for dir in [playbook.parent(), inventory_dir].into_iter().flatten() {
            if !locations.iter().any(|l| l == dir) {
                locations.push(dir.to_path_buf());
            }
        }

        let find = |name: &str| {
            locations
                .iter()
                .map(|dir| dir.join(name))
                .find(|path| path.is_dir())
        };

        VarsDirectories {
            group_vars: find("group_vars"),
            host_vars: find("host_vars"),
        }
    }
}

/// True for `*.yml` and `*.yaml` paths.
pub fn is_yaml_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
    )
}
