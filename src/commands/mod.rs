//! # CLI Command Implementations
//!
//! Each subcommand of `ansible-template-render` lives in its own file with:
//! - An `Args` struct defining its arguments, derived using `clap`.
//! - An `execute` function taking the parsed `Args` and the global options.

pub mod inventory;
pub mod render;
pub mod roles;

use std::path::{Path, PathBuf};

use ansible_template_render::config::InventoryKind;

/// Parse an `--inventory-kind` / `--kind` value.
pub fn parse_inventory_kind(value: &str) -> Result<InventoryKind, String> {
    match value.to_lowercase().as_str() {
        "auto" => Ok(InventoryKind::Auto),
        "flat" | "ini" => Ok(InventoryKind::Flat),
        "structured" | "yaml" => Ok(InventoryKind::Structured),
        "dynamic" => Ok(InventoryKind::Dynamic),
        other => Err(format!(
            "unknown inventory kind '{}' (expected auto, flat, structured or dynamic)",
            other
        )),
    }
}

/// Make `path` absolute against the current directory.
pub fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
