//! Phase 3: Task Rewriting
//!
//! Rewrites the staged task files of every resolved role so that only
//! template tasks run, on the control machine, writing below the output
//! prefix.
//!
//! Each task file is handled on its own:
//!
//! - With no template task, the staged copy is the source file byte-for-byte.
//! - Otherwise the file is replaced by the rewritten task list. Non-template
//!   tasks keep their position; each template task is localized, and the
//!   first template task aiming at a given directory is preceded by a task
//!   that creates that directory.
//!
//! A task file that cannot be read or parsed aborts the playbook. A role
//! without a `tasks/` directory simply has nothing to render.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::document;
use crate::error::{Error, Result};
use crate::logging::Logger;
use crate::phases::staging::copy_file;
use crate::phases::Workspace;
use crate::project::Project;
use crate::task;

/// Result of rewriting one task list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewriteResult {
    /// Full task list in output order.
    pub tasks: Vec<Value>,
    pub template_count: usize,
    pub directory_count: usize,
}

impl RewriteResult {
    pub fn has_templates(&self) -> bool {
        self.template_count > 0
    }
}

/// Rewrite one normalized task list.
///
/// Directory deduplication is scoped to this call.
pub fn rewrite_tasks(tasks: &[Mapping], logger: &Logger) -> RewriteResult {
    let mut result = RewriteResult::default();
    let mut seen_dirs: HashSet<String> = HashSet::new();

    for original in tasks {
        if !task::is_template_task(original) {
            result.tasks.push(Value::Mapping(original.clone()));
            continue;
        }
        result.template_count += 1;

        match task::template_dest(original) {
            Some(dest) => {
                let new_dir = task::dest_dir(&dest).is_some_and(|dir| seen_dirs.insert(dir));
                if new_dir {
                    if let Some(dir_task) = task::directory_task(&dest) {
                        result.tasks.push(Value::Mapping(dir_task));
                        result.directory_count += 1;
                    }
                }
            }
            None => logger.debug(format!(
                "Template task {} has no dest, no directory created",
                task_label(original)
            )),
        }

        match task::rewrite_template_task(original) {
            Ok(rewritten) => result.tasks.push(Value::Mapping(rewritten)),
            Err(e) => {
                logger.warn(format!(
                    "Keeping template task {} unchanged: {}",
                    task_label(original),
                    e
                ));
                result.tasks.push(Value::Mapping(original.clone()));
            }
        }
    }

    result
}

/// Rewrite one task file from `source` into `target`.
///
/// Returns the number of template tasks found.
pub fn rewrite_file(source: &Path, target: &Path, logger: &Logger) -> Result<usize> {
    let doc = document::load(source)?;
    let tasks = task::normalize_tasks(doc, &source.display().to_string())?;
    let result = rewrite_tasks(&tasks, logger);

    if !result.has_templates() {
        if source != target {
            copy_file(source, target)?;
        }
        return Ok(0);
    }

    let content = document::to_string(&Value::Sequence(result.tasks))?;
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| Error::internal(format!("creating {}: {}", parent.display(), e)))?;
    }
    fs::write(target, content)
        .map_err(|e| Error::internal(format!("writing {}: {}", target.display(), e)))?;

    logger.debug(format!(
        "Rewrote {} ({} template tasks, {} directory tasks)",
        target.display(),
        result.template_count,
        result.directory_count
    ));
    Ok(result.template_count)
}

/// Rewrite every task file of one role. Returns true if any held a template.
pub fn rewrite_role(
    project: &Project,
    role: &str,
    workspace: &Workspace,
    logger: &Logger,
) -> Result<bool> {
    let files = match project.find_role_task_files(role) {
        Ok(files) => files,
        Err(e) if e.is_not_found() => {
            logger.debug("No tasks directory, nothing to render");
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    let source_root = project.role_dir(role);
    let target_root = workspace.roles_dir().join(role);
    let mut templates = 0;

    for file in &files {
        let relative = file
            .strip_prefix(&source_root)
            .map_err(|e| Error::internal(e.to_string()))?;
        templates += rewrite_file(file, &target_root.join(relative), logger)?;
    }

    if templates > 0 {
        logger.info(format!("{} template tasks localized", templates));
    }
    Ok(templates > 0)
}

/// Rewrite all resolved roles. Returns true if any role held a template.
pub fn rewrite_roles(
    project: &Project,
    roles: &[String],
    workspace: &Workspace,
    logger: &Logger,
) -> Result<bool> {
    let mut has_templates = false;
    for role in roles {
        has_templates |= rewrite_role(project, role, workspace, &logger.scoped(role))?;
    }
    Ok(has_templates)
}

fn task_label(task: &Mapping) -> String {
    task.get("name")
        .and_then(Value::as_str)
        .map(|name| format!("'{}'", name))
        .unwrap_or_else(|| "(unnamed)".to_string())
}
