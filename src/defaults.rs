//! Fixed names and values shared by the rewriter, the inventory localizer and
//! the engine hand-off.
//!
//! Everything that has to agree between a rewritten task file and the
//! `ansible-playbook` invocation that later runs it lives here.

use std::path::{Path, PathBuf};

/// Tag carried by every rewritten or synthesized task. The engine is run with
/// `--tags` set to this value, so nothing else in the playbook executes.
pub const RENDER_TAG: &str = "render_config";

/// Short alias of the template module.
pub const TEMPLATE_MODULE: &str = "template";

/// Fully-qualified alias of the template module.
pub const TEMPLATE_MODULE_FQCN: &str = "ansible.builtin.template";

/// Extra-var naming the output location prepended to every destination.
pub const DEST_PREFIX_VAR: &str = "template_dest_prefix";

/// Permission mode of synthesized directories.
pub const DIRECTORY_MODE: &str = "0755";

/// Host the rewritten tasks are delegated to.
pub const LOCAL_HOST: &str = "localhost";

/// Inventory variable selecting how Ansible connects to a host.
pub const CONNECTION_VAR: &str = "ansible_connection";

/// Value of [`CONNECTION_VAR`] that keeps execution on the control machine.
pub const LOCAL_CONNECTION: &str = "local";

/// File name of the generated engine configuration.
pub const ENGINE_CONFIG_FILE: &str = "ansible.cfg";

/// File name of a localized structured inventory.
pub const STRUCTURED_INVENTORY_FILE: &str = "inventory.yml";

/// Default configuration file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "template-render.yml";

/// The Jinja expression standing in for the output location.
///
/// Defaults to the empty string when the variable is not supplied, so a
/// rewritten destination degrades to the original one.
pub fn dest_prefix_expr() -> String {
    format!("{{{{ {} | default('') }}}}", DEST_PREFIX_VAR)
}

/// Returns the workspace directory for a playbook under `work_root`.
///
/// Path separators in the playbook name are flattened so that
/// `deploy/site` maps to `tmp-deploy_site`.
pub fn workspace_dir(work_root: &Path, playbook: &str) -> PathBuf {
    let flat: String = playbook
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    work_root.join(format!("tmp-{}", flat))
}
