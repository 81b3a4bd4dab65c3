//! Render command implementation
//!
//! Runs the full pipeline for every configured playbook (or for a single
//! playbook given on the command line) and prints one summary line per
//! playbook. Exits non-zero if any playbook failed.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use ansible_template_render::config::{self, Config, InventoryKind};
use ansible_template_render::defaults::DEFAULT_CONFIG_FILE;
use ansible_template_render::engine::Engine;
use ansible_template_render::logging;
use ansible_template_render::output::{status_line, Marker, OutputConfig};
use ansible_template_render::phases::orchestrator::{self, BatchReport};
use ansible_template_render::project::Project;

use super::{absolute, parse_inventory_kind};
use crate::cli::GlobalOptions;

/// Arguments for the render command
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Path to the configuration file [default: <project-dir>/template-render.yml]
    #[arg(short, long, value_name = "FILE", env = "ANSIBLE_TEMPLATE_RENDER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Render a single playbook instead of the configured ones
    #[arg(short, long, value_name = "NAME", requires = "inventory")]
    pub playbook: Option<String>,

    /// Inventory for --playbook
    #[arg(short, long, value_name = "PATH", requires = "playbook")]
    pub inventory: Option<String>,

    /// How to read the --inventory source (auto, flat, structured, dynamic)
    #[arg(long, value_name = "KIND", default_value = "auto", value_parser = parse_inventory_kind)]
    pub inventory_kind: InventoryKind,

    /// Root of the Ansible project
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// Directory workspaces are created in [default: the project directory]
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Base directory for rendered files; overrides `output_base_dir`
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Keep workspaces after a successful run
    #[arg(long)]
    pub keep_temp: bool,

    /// Prepare workspaces but do not run ansible-playbook
    #[arg(long)]
    pub generate_only: bool,
}

/// Build the effective configuration from the file and the flags.
fn load_config(args: &RenderArgs, project_dir: &std::path::Path) -> Result<Config> {
    let mut config = match (&args.playbook, &args.inventory) {
        (Some(playbook), Some(inventory)) => Config::single(playbook, inventory, args.inventory_kind),
        _ => {
            let path = args
                .config
                .clone()
                .unwrap_or_else(|| project_dir.join(DEFAULT_CONFIG_FILE));
            config::from_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config from {}: {}", path.display(), e))?
        }
    };

    if let Some(dir) = &args.output_dir {
        config.output_base_dir = Some(absolute(dir)?);
    }
    config.options.keep_temp_files |= args.keep_temp;
    config.options.generate_only |= args.generate_only;
    Ok(config)
}

/// Execute the render command
pub fn execute(args: RenderArgs, global: &GlobalOptions) -> Result<()> {
    let project_dir = absolute(&args.project_dir)?;
    if !project_dir.is_dir() {
        anyhow::bail!("Project directory not found: {}", project_dir.display());
    }

    let config = load_config(&args, &project_dir)?;
    logging::init(&global.log_level_or(config.options.log_level.as_deref()));

    let work_root = match &args.work_dir {
        Some(dir) => absolute(dir)?,
        None => project_dir.clone(),
    };

    let project = Project::new(&project_dir);
    let engine = Engine::new();
    let report = orchestrator::run_all(&config, &project, &work_root, &engine);

    print_summary(&report, &global.output);
    report.into_result()?;
    Ok(())
}

fn print_summary(report: &BatchReport, output: &OutputConfig) {
    println!();
    for run in &report.runs {
        let line = if run.executed {
            status_line(
                output,
                Marker::Success,
                &format!("{}: rendered to {}", run.playbook, run.output_dir.display()),
            )
        } else if let Some(command) = &run.manual_command {
            status_line(
                output,
                Marker::Manual,
                &format!(
                    "{}: workspace ready at {}\n   {}",
                    run.playbook,
                    run.workspace.display(),
                    command
                ),
            )
        } else {
            status_line(
                output,
                Marker::Skipped,
                &format!("{}: no template tasks found", run.playbook),
            )
        };
        println!("{}", line);
    }

    for failure in &report.failures {
        println!(
            "{}",
            status_line(
                output,
                Marker::Failure,
                &format!("{}: {}", failure.playbook, failure.error),
            )
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args(project_dir: PathBuf) -> RenderArgs {
        RenderArgs {
            config: None,
            playbook: None,
            inventory: None,
            inventory_kind: InventoryKind::Auto,
            project_dir,
            work_dir: None,
            output_dir: None,
            keep_temp: false,
            generate_only: false,
        }
    }

    fn global() -> GlobalOptions {
        GlobalOptions {
            log_level: Some("error".to_string()),
            output: OutputConfig::without_color(),
        }
    }

    #[test]
    fn test_execute_missing_config() {
        let temp = TempDir::new().unwrap();
        let result = execute(args(temp.path().to_path_buf()), &global());
        let message = result.unwrap_err().to_string();
        assert!(message.contains("Failed to load config"));
        assert!(message.contains("template-render.yml"));
    }

    #[test]
    fn test_execute_missing_project_dir() {
        let result = execute(args(PathBuf::from("/nonexistent/project")), &global());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Project directory not found"));
    }

    #[test]
    fn test_load_config_applies_overrides() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("template-render.yml"),
            "playbooks:\n  - name: site\n    inventory: hosts\n",
        )
        .unwrap();

        let mut render_args = args(temp.path().to_path_buf());
        render_args.output_dir = Some(PathBuf::from("/srv/out"));
        render_args.keep_temp = true;
        render_args.generate_only = true;

        let config = load_config(&render_args, temp.path()).unwrap();
        assert_eq!(config.output_base_dir, Some(PathBuf::from("/srv/out")));
        assert!(config.options.keep_temp_files);
        assert!(config.options.generate_only);
        assert_eq!(config.playbooks[0].name, "site");
    }

    #[test]
    fn test_load_config_ad_hoc_playbook() {
        let temp = TempDir::new().unwrap();
        let mut render_args = args(temp.path().to_path_buf());
        render_args.playbook = Some("site".to_string());
        render_args.inventory = Some("hosts".to_string());
        render_args.inventory_kind = InventoryKind::Flat;

        let config = load_config(&render_args, temp.path()).unwrap();
        assert_eq!(config.playbooks.len(), 1);
        assert_eq!(config.playbooks[0].inventory, "hosts");
        assert_eq!(config.playbooks[0].inventory_kind, InventoryKind::Flat);
    }
}
