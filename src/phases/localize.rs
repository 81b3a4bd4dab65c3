//! Phase 4: Inventory Localization
//!
//! Writes an inventory into the workspace in which every host uses the local
//! connection. The source inventory is read, never modified.
//!
//! Flat sources keep their file name. Structured and dynamic sources are
//! written as `inventory.yml`. Any failure here is fatal for the playbook: an
//! inventory that is not known to be fully local must never reach the engine.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::InventoryKind;
use crate::defaults::STRUCTURED_INVENTORY_FILE;
use crate::document;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::inventory;
use crate::logging::Logger;
use crate::phases::Workspace;

/// Decide how to read an inventory source.
///
/// An explicit kind is returned as-is. For `Auto`:
/// - a directory or an executable file is listed through Ansible,
/// - a YAML or JSON file naming an inventory `plugin` is listed through Ansible,
/// - any other YAML or JSON file is read as a group tree,
/// - everything else is flat INI text.
pub fn detect_kind(source: &Path, requested: InventoryKind) -> InventoryKind {
    if requested != InventoryKind::Auto {
        return requested;
    }

    if source.is_dir() || is_executable(source) {
        return InventoryKind::Dynamic;
    }

    let structured_ext = matches!(
        source.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml") | Some("json")
    );
    if !structured_ext {
        return InventoryKind::Flat;
    }

    match document::load(source) {
        Ok(doc) if doc.get("plugin").is_some() => InventoryKind::Dynamic,
        _ => InventoryKind::Structured,
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    false
}

/// Produce the localized inventory text for a source without writing it.
///
/// Returns the resolved kind alongside the text.
pub fn render(
    source: &Path,
    requested: InventoryKind,
    engine: &Engine,
    logger: &Logger,
) -> Result<(InventoryKind, String)> {
    let kind = detect_kind(source, requested);
    logger.debug(format!("Reading inventory {} as {:?}", source.display(), kind));

    let text = match kind {
        InventoryKind::Flat => {
            let content = fs::read_to_string(source).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::not_found("inventory", source.display())
                } else {
                    Error::Parse {
                        path: source.display().to_string(),
                        message: e.to_string(),
                    }
                }
            })?;
            inventory::localize_flat(&content)
        }
        InventoryKind::Structured | InventoryKind::Auto => {
            let doc = document::load(source)?;
            localized_tree(&doc, logger)?
        }
        InventoryKind::Dynamic => {
            let listing = engine.list_inventory(source)?;
            let doc = document::parse(&listing, "ansible-inventory output")?;
            localized_tree(&doc, logger)?
        }
    };

    Ok((kind, text))
}

fn localized_tree(doc: &serde_yaml::Value, logger: &Logger) -> Result<String> {
    let localized = inventory::localize_structured(doc);
    logger.debug(format!(
        "{} hosts forced to local connection",
        inventory::structured_host_count(&localized)
    ));
    document::to_string(&localized)
}

/// Localize `source` into the workspace. Returns the written artifact's path.
pub fn localize(
    source: &Path,
    requested: InventoryKind,
    workspace: &Workspace,
    engine: &Engine,
    logger: &Logger,
) -> Result<PathBuf> {
    let (kind, text) = render(source, requested, engine, logger)?;

    let file_name = match kind {
        InventoryKind::Flat => source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "hosts".to_string()),
        _ => STRUCTURED_INVENTORY_FILE.to_string(),
    };

    let target = workspace.root.join(file_name);
    fs::write(&target, text)
        .map_err(|e| Error::internal(format!("writing {}: {}", target.display(), e)))?;

    logger.info(format!("Localized inventory written to {}", target.display()));
    Ok(target)
}
