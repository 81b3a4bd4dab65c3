//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use ansible_template_render::output::OutputConfig;

use crate::commands;

/// Ansible Template Render - Render a playbook's templates locally
#[derive(Parser, Debug)]
#[command(name = "ansible-template-render")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    ///
    /// Defaults to the configuration file's `options.log_level`, then `info`.
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render the templates of the configured playbooks
    Render(commands::render::RenderArgs),

    /// Show the roles a playbook uses, dependencies first
    Roles(commands::roles::RolesArgs),

    /// Print an inventory with every host forced to a local connection
    Inventory(commands::inventory::InventoryArgs),
}

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub log_level: Option<String>,
    pub output: OutputConfig,
}

impl GlobalOptions {
    /// The effective log level, given a fallback from configuration.
    pub fn log_level_or(&self, configured: Option<&str>) -> String {
        self.log_level
            .as_deref()
            .or(configured)
            .unwrap_or("info")
            .to_string()
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let global = GlobalOptions {
            log_level: self.log_level,
            output: OutputConfig::from_env_and_flag(&self.color),
        };

        match self.command {
            Commands::Render(args) => commands::render::execute(args, &global),
            Commands::Roles(args) => commands::roles::execute(args, &global),
            Commands::Inventory(args) => commands::inventory::execute(args, &global),
        }
    }
}
