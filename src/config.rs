//! # Run Configuration
//!
//! This module defines the YAML configuration file that tells the tool which
//! playbooks to prepare, which inventory each one uses and where rendered
//! files end up.
//!
//! ```yaml
//! output_base_dir: ./rendered
//! playbooks:
//!   - name: site
//!     inventory: inventories/production
//!   - name: monitoring
//!     inventory: inventories/aws_ec2.yml
//!     inventory_kind: dynamic
//! options:
//!   keep_temp_files: false
//!   generate_only: false
//!   log_level: info
//!   ansible_args: "--diff"
//! ```
//!
//! `parse` validates the document after deserializing it; `from_file` also
//! resolves `output_base_dir` to an absolute path.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How an inventory source should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryKind {
    /// Decide from the source itself.
    #[default]
    Auto,
    /// INI-style line-oriented inventory.
    Flat,
    /// YAML/JSON group tree read directly from the file.
    Structured,
    /// Anything that has to be listed through `ansible-inventory`.
    Dynamic,
}

/// One playbook to prepare.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybookConfig {
    /// Playbook name (without extension) or path, relative to the project.
    pub name: String,
    /// Inventory locator, relative to the project.
    pub inventory: String,
    #[serde(default)]
    pub inventory_kind: InventoryKind,
}

/// Runtime options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Options {
    /// Keep the workspace after a successful run.
    #[serde(default)]
    pub keep_temp_files: bool,
    /// Prepare the workspace but do not invoke `ansible-playbook`.
    #[serde(default)]
    pub generate_only: bool,
    #[serde(default)]
    pub log_level: Option<String>,
    /// Extra arguments appended to the `ansible-playbook` command line.
    #[serde(default)]
    pub ansible_args: Option<String>,
}

/// The complete configuration for one invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where rendered files go; each playbook gets its own sub-directory.
    #[serde(default)]
    pub output_base_dir: Option<PathBuf>,
    pub playbooks: Vec<PlaybookConfig>,
    #[serde(default)]
    pub options: Options,
}

impl Config {
    /// Build a single-playbook configuration without a config file.
    pub fn single(name: &str, inventory: &str, inventory_kind: InventoryKind) -> Self {
        Self {
            output_base_dir: None,
            playbooks: vec![PlaybookConfig {
                name: name.to_string(),
                inventory: inventory.to_string(),
                inventory_kind,
            }],
            options: Options::default(),
        }
    }

    /// Extra `ansible-playbook` arguments, split on whitespace.
    pub fn extra_args(&self) -> Vec<String> {
        self.options
            .ansible_args
            .as_deref()
            .map(|args| args.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn validate(&self) -> Result<()> {
        if self.playbooks.is_empty() {
            return Err(Error::Config {
                message: "no playbooks specified".to_string(),
                hint: Some("Add a 'playbooks:' list with at least one entry".to_string()),
            });
        }

        for (i, playbook) in self.playbooks.iter().enumerate() {
            if playbook.name.trim().is_empty() {
                return Err(Error::Config {
                    message: format!("playbook #{} missing name", i + 1),
                    hint: None,
                });
            }
            if playbook.inventory.trim().is_empty() {
                return Err(Error::Config {
                    message: format!("playbook '{}' missing inventory", playbook.name),
                    hint: Some("Set 'inventory:' to an inventory file or directory".to_string()),
                });
            }
        }

        Ok(())
    }
}

/// Parse and validate configuration YAML.
pub fn parse(yaml_content: &str) -> Result<Config> {
    let config: Config = serde_yaml::from_str(yaml_content).map_err(|e| Error::Config {
        message: e.to_string(),
        hint: None,
    })?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file.
pub fn from_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::not_found("configuration file", path.display())
        } else {
            Error::Io(e)
        }
    })?;
    let mut config = parse(&content)?;

    if let Some(dir) = &config.output_base_dir {
        if dir.is_relative() {
            config.output_base_dir = Some(std::env::current_dir()?.join(dir));
        }
    }

    Ok(config)
}
