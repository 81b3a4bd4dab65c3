//! Thin wrappers around the Ansible command-line tools
//!
//! These use the system `ansible-inventory` and `ansible-playbook` binaries,
//! so whatever Python environment, collections and plugins are configured
//! for the user are picked up automatically.

use std::path::Path;
use std::process::Command;

use crate::engine::PlaybookInvocation;
use crate::error::{Error, Result};

const INVENTORY_BIN: &str = "ansible-inventory";
const PLAYBOOK_BIN: &str = "ansible-playbook";

/// List an inventory source as a YAML group tree.
///
/// Runs `ansible-inventory -i <source> --list --yaml` and returns its
/// standard output. Inventory plugins and scripts are executed by Ansible
/// itself.
pub fn list_inventory(source: &Path) -> Result<String> {
    let command = format!("{} -i {} --list --yaml", INVENTORY_BIN, source.display());

    let output = Command::new(INVENTORY_BIN)
        .arg("-i")
        .arg(source)
        .args(["--list", "--yaml"])
        .output()
        .map_err(|e| Error::ExecutionFailure {
            command: command.clone(),
            status: format!("failed to start: {}", e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::ExecutionFailure {
            command,
            status: format!("{}: {}", output.status, stderr.trim()),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Run `ansible-playbook` for a prepared workspace.
///
/// Output streams straight to the terminal; the call blocks until the
/// process exits.
pub fn run_playbook(invocation: &PlaybookInvocation) -> Result<()> {
    let status = Command::new(PLAYBOOK_BIN)
        .args(invocation.args())
        .current_dir(&invocation.workspace)
        .env("ANSIBLE_CONFIG", &invocation.config_file)
        .status()
        .map_err(|e| Error::ExecutionFailure {
            command: invocation.command_line(),
            status: format!("failed to start: {}", e),
        })?;

    if !status.success() {
        return Err(Error::ExecutionFailure {
            command: invocation.command_line(),
            status: status.to_string(),
        });
    }

    Ok(())
}

/// Program name used in rendered command lines.
pub fn playbook_program() -> &'static str {
    PLAYBOOK_BIN
}
