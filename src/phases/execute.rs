//! Phase 5: Engine Execution
//!
//! Runs `ansible-playbook` once against a prepared workspace, restricted to
//! the render tag, and removes the workspace afterwards when nothing needs
//! it any more.
//!
//! A failing engine run is reported as `Error::ExecutionFailure` and never
//! retried.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Options;
use crate::engine::{Engine, PlaybookInvocation};
use crate::error::{Error, Result};
use crate::logging::Logger;
use crate::phases::{PreparedPlaybook, Workspace};

/// What happened in the execution phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Execution {
    /// The engine ran and succeeded.
    Ran,
    /// No template task was found, so there was nothing to run.
    NothingToRender,
    /// Generate-only mode; the command to run by hand.
    Manual(String),
}

/// Where rendered files go for one playbook.
///
/// `<output_base_dir>/<playbook>` when a base directory is configured,
/// otherwise the workspace's own `output/` directory.
pub fn output_dir(output_base_dir: Option<&Path>, playbook: &str, workspace: &Workspace) -> PathBuf {
    match output_base_dir {
        Some(base) => base.join(playbook),
        None => workspace.output_dir(),
    }
}

/// Build the engine invocation for a prepared playbook.
pub fn invocation(
    prepared: &PreparedPlaybook,
    output_dir: &Path,
    extra_args: &[String],
) -> PlaybookInvocation {
    PlaybookInvocation {
        playbook: prepared.playbook_file.clone(),
        inventory: prepared.inventory.clone(),
        workspace: prepared.workspace.root.clone(),
        config_file: prepared.workspace.config_file(),
        output_dir: output_dir.to_path_buf(),
        extra_args: extra_args.to_vec(),
    }
}

/// Run the engine for a prepared playbook, unless there is nothing to do.
pub fn execute(
    prepared: &PreparedPlaybook,
    output_dir: &Path,
    options: &Options,
    extra_args: &[String],
    engine: &Engine,
    logger: &Logger,
) -> Result<Execution> {
    if !prepared.has_templates {
        logger.info("No template tasks found, skipping ansible-playbook");
        return Ok(Execution::NothingToRender);
    }

    fs::create_dir_all(output_dir)
        .map_err(|e| Error::internal(format!("creating {}: {}", output_dir.display(), e)))?;

    let invocation = invocation(prepared, output_dir, extra_args);

    if options.generate_only {
        let command = invocation.command_line();
        logger.info(format!("Workspace ready. Run manually:\n  {}", command));
        return Ok(Execution::Manual(command));
    }

    logger.info(format!("Running {}", invocation.command_line()));
    engine.run_playbook(&invocation)?;
    logger.info(format!("Rendered files written to {}", output_dir.display()));
    Ok(Execution::Ran)
}

/// Remove the workspace if it is no longer needed.
///
/// It is kept when asked to, in generate-only mode, and when the engine ran
/// with its output directory inside the workspace. A run with nothing to
/// render leaves nothing worth keeping. Returns true if it was removed.
pub fn cleanup(
    workspace: &Workspace,
    output_dir: &Path,
    execution: &Execution,
    options: &Options,
    logger: &Logger,
) -> Result<bool> {
    let holds_output = *execution == Execution::Ran && workspace.contains(output_dir);
    if options.keep_temp_files || options.generate_only || holds_output {
        logger.debug(format!("Keeping workspace {}", workspace.root.display()));
        return Ok(false);
    }

    fs::remove_dir_all(&workspace.root).map_err(|e| {
        Error::internal(format!(
            "removing workspace {}: {}",
            workspace.root.display(),
            e
        ))
    })?;
    logger.debug(format!("Removed workspace {}", workspace.root.display()));
    Ok(true)
}
