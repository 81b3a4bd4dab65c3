//! # Roles Command Implementation
//!
//! Shows which roles a playbook pulls in:
//!
//! - By default, the resolved closure one role per line, in the order the
//!   pipeline processes them (dependencies first).
//! - With `--json`, declared and resolved roles as a JSON document.
//! - With `--tree`, the declared dependency tree. Roles that depend on
//!   themselves through a cycle are marked and not expanded again.
//!
//! This command is read-only and never invokes Ansible.

use anyhow::Result;
use clap::Args;
use ptree::TreeItem;
use serde::Serialize;
use std::path::PathBuf;

use ansible_template_render::logging::{self, Logger};
use ansible_template_render::phases::{resolution, RoleNode};
use ansible_template_render::playbook;
use ansible_template_render::project::Project;

use super::absolute;
use crate::cli::GlobalOptions;

/// Show the roles a playbook uses
#[derive(Args, Debug)]
pub struct RolesArgs {
    /// Playbook name (without extension) or path, relative to the project
    #[arg(value_name = "PLAYBOOK")]
    pub playbook: String,

    /// Root of the Ansible project
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// Print the result as JSON
    #[arg(long, conflicts_with = "tree")]
    pub json: bool,

    /// Print the declared dependency tree
    #[arg(long)]
    pub tree: bool,
}

#[derive(Debug, Serialize)]
struct RolesReport<'a> {
    playbook: &'a str,
    declared: &'a [String],
    resolved: &'a [String],
}

/// Execute the `roles` command.
pub fn execute(args: RolesArgs, global: &GlobalOptions) -> Result<()> {
    logging::init(&global.log_level_or(Some("warn")));

    let project = Project::new(absolute(&args.project_dir)?);
    let playbook_path = project.find_playbook(&args.playbook)?;
    let plays = playbook::load(&playbook_path)?;
    let declared = playbook::extract_roles(&plays);
    let logger = Logger::new(&args.playbook);

    if args.tree {
        let nodes = resolution::dependency_tree(&declared, &project, &logger);
        print!("{}", render_tree(&args.playbook, &nodes)?);
        return Ok(());
    }

    let resolved = resolution::resolve_closure(&declared, &project, &logger);
    if args.json {
        let report = RolesReport {
            playbook: &args.playbook,
            declared: &declared,
            resolved: &resolved,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for role in &resolved {
            println!("{}", role);
        }
    }

    Ok(())
}

/// Render the dependency tree below a playbook as text.
fn render_tree(playbook: &str, nodes: &[RoleNode]) -> Result<String> {
    let root = TreeNode {
        label: playbook.to_string(),
        children: nodes.iter().map(TreeNode::from_role).collect(),
    };

    let mut buffer = Vec::new();
    ptree::write_tree(&root, &mut buffer)
        .map_err(|e| anyhow::anyhow!("Failed to display tree: {}", e))?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Tree node structure for ptree visualization
#[derive(Clone)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeNode {
    fn from_role(node: &RoleNode) -> Self {
        let label = if node.cycle {
            format!("{} (cycle)", node.name)
        } else {
            node.name.clone()
        };
        TreeNode {
            label,
            children: node.children.iter().map(TreeNode::from_role).collect(),
        }
    }
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: std::io::Write>(
        &self,
        f: &mut W,
        _style: &ptree::Style,
    ) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> std::borrow::Cow<'_, [Self::Child]> {
        std::borrow::Cow::Borrowed(&self.children)
    }
}
