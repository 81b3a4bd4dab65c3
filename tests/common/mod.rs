//! Shared test utilities for integration and E2E tests.
//!
//! Provides a temporary Ansible project fixture and a few canned documents.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_sample_project();
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::files;
    pub use super::TestFixture;
}

/// Canned project files.
#[allow(dead_code)]
pub mod files {
    /// Playbook using two roles, one declared through a mapping.
    pub const SITE_PLAYBOOK: &str = r#"
- hosts: web
  become: true
  roles:
    - common
    - role: app
      vars:
        app_port: 8080
"#;

    /// Flat inventory with a vars section and a children section.
    pub const FLAT_INVENTORY: &str = "\
# production
[web]
web1 ansible_host=10.0.0.1 ansible_connection=ssh ansible_user=deploy
web2 ansible_host=10.0.0.2

[web:vars]
http_port=80

[prod:children]
web
";

    /// `app` depends on `base`.
    pub const APP_META: &str = "dependencies:\n  - role: base\n";

    /// `app` tasks: a package task followed by two templates in one directory.
    pub const APP_TASKS: &str = r#"
- name: Install app
  package:
    name: app
- name: Render main config
  template:
    src: app.conf.j2
    dest: /etc/app/app.conf
  notify: restart app
- name: Render env file
  ansible.builtin.template:
    src: env.j2
    dest: /etc/app/env
  tags: [config]
"#;

    /// `base` tasks without templates; comments must survive untouched.
    pub const BASE_TASKS: &str = "---\n# Base packages\n- name: Install curl\n  package: {name: curl}   # always\n";

    /// `common` renders a file elsewhere.
    pub const COMMON_TASKS: &str = r#"
- name: Render motd
  template: src=motd.j2 dest=/etc/motd
"#;
}

/// A temporary Ansible project.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add a `template-render.yml` configuration file.
    #[allow(dead_code)]
    pub fn with_config(self, content: &str) -> Self {
        self.with_file("template-render.yml", content)
    }

    /// Populate a small project: `site.yml`, a flat `hosts` inventory,
    /// `group_vars`, and roles `common`, `app` and `base` (`app -> base`).
    pub fn with_sample_project(self) -> Self {
        self.with_file("site.yml", files::SITE_PLAYBOOK)
            .with_file("hosts", files::FLAT_INVENTORY)
            .with_file("group_vars/web.yml", "app_port: 8080\n")
            .with_file("roles/common/tasks/main.yml", files::COMMON_TASKS)
            .with_file("roles/common/templates/motd.j2", "Welcome\n")
            .with_file("roles/app/meta/main.yml", files::APP_META)
            .with_file("roles/app/tasks/main.yml", files::APP_TASKS)
            .with_file("roles/app/templates/app.conf.j2", "port={{ app_port }}\n")
            .with_file("roles/app/templates/env.j2", "ENV=prod\n")
            .with_file("roles/app/handlers/main.yml", "- name: restart app\n  service: {name: app, state: restarted}\n")
            .with_file("roles/base/tasks/main.yml", files::BASE_TASKS)
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of a file inside the fixture.
    #[allow(dead_code)]
    pub fn join(&self, path: &str) -> PathBuf {
        self.temp_dir.path().join(path)
    }

    /// Read a file inside the fixture.
    #[allow(dead_code)]
    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.join(path)).expect("Failed to read file")
    }

    /// Create a command configured to run in this fixture's directory.
    #[allow(dead_code)]
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("ansible-template-render");
        cmd.current_dir(self.path());
        cmd.env_remove("ANSIBLE_TEMPLATE_RENDER_CONFIG");
        cmd.env("NO_COLOR", "1");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
