//! Inventory command implementation
//!
//! Prints the localized form of an inventory to stdout, exactly as the
//! render pipeline would write it into a workspace. Useful for checking that
//! every host really ends up on a local connection before rendering.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use ansible_template_render::config::InventoryKind;
use ansible_template_render::engine::Engine;
use ansible_template_render::logging::{self, Logger};
use ansible_template_render::phases::localize;

use super::parse_inventory_kind;
use crate::cli::GlobalOptions;

/// Arguments for the inventory command
#[derive(Args, Debug)]
pub struct InventoryArgs {
    /// Inventory file, directory or plugin configuration
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// How to read the source (auto, flat, structured, dynamic)
    #[arg(long, value_name = "KIND", default_value = "auto", value_parser = parse_inventory_kind)]
    pub kind: InventoryKind,
}

/// Execute the inventory command
pub fn execute(args: InventoryArgs, global: &GlobalOptions) -> Result<()> {
    logging::init(&global.log_level_or(Some("warn")));

    let logger = Logger::new(args.path.display().to_string());
    let engine = Engine::new();
    let (_, text) = localize::render(&args.path, args.kind, &engine, &logger)?;
    print!("{}", text);
    Ok(())
}
