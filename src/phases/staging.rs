//! Phase 2: Workspace Staging
//!
//! Builds the isolated workspace a playbook is rendered from:
//!
//! ```text
//! tmp-<playbook>/
//!   <playbook>.yml
//!   group_vars/  host_vars/     (when the project has them)
//!   roles/<role>/...            (every resolved role, copied verbatim)
//!   output/
//!   ansible.cfg
//! ```
//!
//! Nothing in the source project is modified. Task files are copied as-is
//! here and rewritten in place by the next phase.

use std::fs;
use std::path::Path;

use ini::Ini;
use walkdir::WalkDir;

use crate::defaults;
use crate::error::{Error, Result};
use crate::logging::Logger;
use crate::phases::Workspace;
use crate::project::Project;

/// Create a fresh workspace for `playbook` under `work_root`.
///
/// A leftover workspace from an earlier run is removed first.
pub fn create_workspace(work_root: &Path, playbook: &str, logger: &Logger) -> Result<Workspace> {
    let workspace = Workspace::new(defaults::workspace_dir(work_root, playbook));

    if workspace.root.exists() {
        logger.debug(format!(
            "Removing previous workspace {}",
            workspace.root.display()
        ));
        fs::remove_dir_all(&workspace.root).map_err(|e| {
            Error::internal(format!(
                "removing old workspace {}: {}",
                workspace.root.display(),
                e
            ))
        })?;
    }

    for dir in [workspace.roles_dir(), workspace.output_dir()] {
        fs::create_dir_all(&dir)
            .map_err(|e| Error::internal(format!("creating {}: {}", dir.display(), e)))?;
    }

    logger.debug(format!("Created workspace {}", workspace.root.display()));
    Ok(workspace)
}

/// Copy the playbook, its vars directories and its roles into the workspace,
/// then write the engine configuration.
///
/// Returns the playbook's file name inside the workspace.
pub fn stage(
    project: &Project,
    playbook: &Path,
    inventory: &Path,
    roles: &[String],
    workspace: &Workspace,
    logger: &Logger,
) -> Result<String> {
    let playbook_file = playbook
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::internal(format!("playbook path {} has no file name", playbook.display())))?;
    copy_file(playbook, &workspace.root.join(&playbook_file))?;

    let vars = project.find_vars_dirs(playbook, inventory);
    for (name, dir) in [("group_vars", &vars.group_vars), ("host_vars", &vars.host_vars)] {
        if let Some(dir) = dir {
            let copied = copy_dir(dir, &workspace.root.join(name))?;
            logger.debug(format!("Copied {} ({} files) from {}", name, copied, dir.display()));
        }
    }

    for role in roles {
        let source = project.role_dir(role);
        if !source.is_dir() {
            logger.warn(format!(
                "Role '{}' not found at {}, skipping",
                role,
                source.display()
            ));
            continue;
        }
        let copied = copy_dir(&source, &workspace.roles_dir().join(role))?;
        logger.debug(format!("Staged role '{}' ({} files)", role, copied));
    }

    write_engine_config(workspace)?;
    Ok(playbook_file)
}

/// Write `ansible.cfg` for the isolated run.
pub fn write_engine_config(workspace: &Workspace) -> Result<()> {
    let mut conf = Ini::new();
    conf.with_section(Some("defaults"))
        .set("roles_path", workspace.roles_dir().to_string_lossy())
        .set("host_key_checking", "False")
        .set("retry_files_enabled", "False")
        .set("local_tmp", workspace.local_tmp().to_string_lossy());
    conf.with_section(Some("ssh_connection"))
        .set("pipelining", "True");

    let path = workspace.config_file();
    conf.write_to_file(&path)
        .map_err(|e| Error::internal(format!("writing {}: {}", path.display(), e)))
}

/// Recursively copy a directory. Returns the number of files copied.
pub fn copy_dir(source: &Path, target: &Path) -> Result<usize> {
    let mut copied = 0;

    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry
            .map_err(|e| Error::internal(format!("walking {}: {}", source.display(), e)))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| Error::internal(e.to_string()))?;
        let destination = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination).map_err(|e| {
                Error::internal(format!("creating {}: {}", destination.display(), e))
            })?;
        } else {
            copy_file(entry.path(), &destination)?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Copy one file byte-for-byte, creating parent directories as needed.
pub fn copy_file(source: &Path, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| Error::internal(format!("creating {}: {}", parent.display(), e)))?;
    }
    fs::copy(source, target).map_err(|e| {
        Error::internal(format!(
            "copying {} to {}: {}",
            source.display(),
            target.display(),
            e
        ))
    })?;
    Ok(())
}
