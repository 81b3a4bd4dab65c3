//! # Ansible Template Render Library
//!
//! This library prepares an Ansible project so that only its template tasks
//! run, against the local machine, producing the configuration files a
//! playbook would deploy without touching any real host. It backs the
//! `ansible-template-render` command-line tool.
//!
//! ## Quick Example
//!
//! ```
//! use ansible_template_render::inventory;
//! use ansible_template_render::playbook;
//!
//! let plays: Vec<serde_yaml::Value> = serde_yaml::from_str(r#"
//! - hosts: web
//!   roles:
//!     - common
//!     - role: nginx
//! "#).unwrap();
//! assert_eq!(playbook::extract_roles(&plays), vec!["common", "nginx"]);
//!
//! let localized = inventory::localize_flat("[web]\nweb1 ansible_connection=ssh\n");
//! assert_eq!(localized, "[web]\nweb1 ansible_connection=local\n");
//! ```
//!
//! ## Core Concepts
//!
//! - **Documents (`document`)**: playbooks, meta files, task files and
//!   inventories are untyped YAML trees read through forgiving accessors.
//! - **Roles (`playbook`, `role`)**: the roles a playbook declares and the
//!   dependencies their meta files declare.
//! - **Tasks (`task`)**: recognizing and rewriting template tasks.
//! - **Inventories (`inventory`)**: forcing every host onto the local
//!   connection, for flat and structured inventories alike.
//! - **Engine (`engine`, `ansible`)**: the two points where Ansible itself
//!   is invoked, behind traits.
//! - **Phases (`phases`)**: the per-playbook pipeline tying it together.
//!
//! ## Execution Flow
//!
//! The entry point is `phases::orchestrator`, which for each playbook:
//!
//! 1.  **Resolution**: Expands declared roles to their dependency closure.
//! 2.  **Staging**: Copies playbook, vars and roles into an isolated workspace.
//! 3.  **Rewrite**: Localizes template tasks and adds directory tasks.
//! 4.  **Localize**: Writes an inventory where every host is local.
//! 5.  **Execute**: Runs `ansible-playbook --tags render_config` once.

pub mod ansible;
pub mod config;
pub mod defaults;
pub mod document;
pub mod engine;
pub mod error;
pub mod inventory;
pub mod logging;
pub mod output;
pub mod phases;
pub mod playbook;
pub mod project;
pub mod role;
pub mod task;

#[cfg(test)]
mod inventory_proptest;
