//! # Automation Engine Hand-off
//!
//! The pipeline talks to Ansible at exactly two points: listing a dynamic
//! inventory and running the prepared playbook. Each is behind a trait so the
//! pipeline can be exercised without Ansible installed:
//!
//! - **`InventoryLister`**: turns an inventory source into a YAML group tree.
//! - **`PlaybookRunner`**: runs one `PlaybookInvocation` to completion.
//!
//! `Engine` bundles one of each. `Engine::new()` uses the system binaries
//! through `AnsibleInventoryCli` and `AnsiblePlaybookCli`; tests swap in
//! recording mocks with `Engine::with_operations`.

use std::path::{Path, PathBuf};

use crate::defaults::{CONNECTION_VAR, DEST_PREFIX_VAR, LOCAL_CONNECTION, RENDER_TAG};
use crate::error::Result;

/// Everything needed to run the engine against a prepared workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybookInvocation {
    /// Playbook file name, relative to the workspace.
    pub playbook: String,
    /// Localized inventory artifact.
    pub inventory: PathBuf,
    /// Working directory of the engine process.
    pub workspace: PathBuf,
    /// Value for `ANSIBLE_CONFIG`.
    pub config_file: PathBuf,
    /// Where rendered files land; supplied as the destination prefix.
    pub output_dir: PathBuf,
    pub extra_args: Vec<String>,
}

impl PlaybookInvocation {
    /// Arguments passed to `ansible-playbook`.
    ///
    /// The prefix variable goes in as a JSON extra-var so an output path
    /// containing spaces survives Ansible's `key=value` splitting. The local
    /// connection is repeated there too: extra-vars outrank `host_vars/`
    /// files copied into the workspace.
    pub fn args(&self) -> Vec<String> {
        let extra_vars = serde_json::json!({
            CONNECTION_VAR: LOCAL_CONNECTION,
            DEST_PREFIX_VAR: self.output_dir.to_string_lossy(),
        });

        let mut args = vec![
            self.playbook.clone(),
            "--tags".to_string(),
            RENDER_TAG.to_string(),
            "-i".to_string(),
            self.inventory.to_string_lossy().into_owned(),
            "-e".to_string(),
            extra_vars.to_string(),
        ];
        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// A shell command line reproducing this invocation by hand.
    pub fn command_line(&self) -> String {
        let mut parts = vec![
            format!("cd {}", shell_quote(&self.workspace.to_string_lossy())),
            "&&".to_string(),
            format!(
                "ANSIBLE_CONFIG={}",
                shell_quote(&self.config_file.to_string_lossy())
            ),
            crate::ansible::playbook_program().to_string(),
        ];
        parts.extend(self.args().iter().map(|a| shell_quote(a)));
        parts.join(" ")
    }
}

/// Quote `arg` for a POSIX shell when it contains anything unusual.
fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Produces the group tree of an inventory source as YAML text.
pub trait InventoryLister {
    fn list(&self, source: &Path) -> Result<String>;
}

/// Runs the engine against a prepared workspace, blocking until it exits.
pub trait PlaybookRunner {
    fn run(&self, invocation: &PlaybookInvocation) -> Result<()>;
}

/// `InventoryLister` backed by the `ansible-inventory` binary.
pub struct AnsibleInventoryCli;

impl InventoryLister for AnsibleInventoryCli {
    fn list(&self, source: &Path) -> Result<String> {
        crate::ansible::list_inventory(source)
    }
}

/// `PlaybookRunner` backed by the `ansible-playbook` binary.
pub struct AnsiblePlaybookCli;

impl PlaybookRunner for AnsiblePlaybookCli {
    fn run(&self, invocation: &PlaybookInvocation) -> Result<()> {
        crate::ansible::run_playbook(invocation)
    }
}

/// The pair of engine collaborators used by one pipeline run.
pub struct Engine {
    lister: Box<dyn InventoryLister>,
    runner: Box<dyn PlaybookRunner>,
}

impl Engine {
    /// Use the system Ansible binaries.
    pub fn new() -> Self {
        Self::with_operations(Box::new(AnsibleInventoryCli), Box::new(AnsiblePlaybookCli))
    }

    /// Use custom collaborators (mainly for tests).
    pub fn with_operations(
        lister: Box<dyn InventoryLister>,
        runner: Box<dyn PlaybookRunner>,
    ) -> Self {
        Self { lister, runner }
    }

    pub fn list_inventory(&self, source: &Path) -> Result<String> {
        self.lister.list(source)
    }

    pub fn run_playbook(&self, invocation: &PlaybookInvocation) -> Result<()> {
        self.runner.run(invocation)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
