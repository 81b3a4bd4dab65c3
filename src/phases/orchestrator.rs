//! Orchestrator for complete render runs
//!
//! Sequences the phases for each configured playbook. Playbooks are handled
//! one after another; a failure is reported for its own playbook and the
//! batch carries on with the next.

use std::path::Path;

use super::{phase1, phase2, phase3, phase4, phase5};
use super::{PreparedPlaybook, RunReport};
use crate::config::{Config, PlaybookConfig};
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::logging::Logger;
use crate::playbook;
use crate::project::Project;

/// A playbook that failed during a batch run.
#[derive(Debug)]
pub struct PlaybookFailure {
    pub playbook: String,
    pub error: Error,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub runs: Vec<RunReport>,
    pub failures: Vec<PlaybookFailure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.runs.len() + self.failures.len()
    }

    /// Turn the report into an error if any playbook failed.
    pub fn into_result(self) -> Result<Vec<RunReport>> {
        if self.failures.is_empty() {
            Ok(self.runs)
        } else {
            Err(Error::BatchFailed {
                failed: self.failures.len(),
                total: self.total(),
            })
        }
    }
}

/// Prepare one playbook's workspace (Phases 1-4).
///
/// 1. Resolve the playbook's roles to their dependency closure
/// 2. Stage the playbook, vars directories and roles into a fresh workspace
/// 3. Rewrite the staged task files
/// 4. Write the localized inventory
pub fn prepare(
    playbook_config: &PlaybookConfig,
    project: &Project,
    work_root: &Path,
    engine: &Engine,
    logger: &Logger,
) -> Result<PreparedPlaybook> {
    let playbook_path = project.find_playbook(&playbook_config.name)?;
    let inventory_path = project.find_inventory(&playbook_config.inventory)?;

    // Phase 1: Role Resolution
    let plays = playbook::load(&playbook_path)?;
    let direct_roles = playbook::extract_roles(&plays);
    let roles = phase1::resolve_closure(&direct_roles, project, logger);
    logger.info(format!(
        "{} roles ({} declared directly)",
        roles.len(),
        direct_roles.len()
    ));

    // Phase 2: Workspace Staging
    let workspace = phase2::create_workspace(work_root, &playbook_config.name, logger)?;
    let playbook_file = phase2::stage(
        project,
        &playbook_path,
        &inventory_path,
        &roles,
        &workspace,
        logger,
    )?;

    // Phase 3: Task Rewriting
    let has_templates = phase3::rewrite_roles(project, &roles, &workspace, logger)?;

    // Phase 4: Inventory Localization
    let inventory = phase4::localize(
        &inventory_path,
        playbook_config.inventory_kind,
        &workspace,
        engine,
        logger,
    )?;

    Ok(PreparedPlaybook {
        name: playbook_config.name.clone(),
        playbook_file,
        roles,
        has_templates,
        inventory,
        workspace,
    })
}

/// Prepare and execute one playbook (Phases 1-5), then clean up.
pub fn run_playbook(
    playbook_config: &PlaybookConfig,
    config: &Config,
    project: &Project,
    work_root: &Path,
    engine: &Engine,
    logger: &Logger,
) -> Result<RunReport> {
    let prepared = prepare(playbook_config, project, work_root, engine, logger)?;
    let output_dir = phase5::output_dir(
        config.output_base_dir.as_deref(),
        &prepared.name,
        &prepared.workspace,
    );

    // Phase 5: Engine Execution
    let execution = phase5::execute(
        &prepared,
        &output_dir,
        &config.options,
        &config.extra_args(),
        engine,
        logger,
    )?;
    let cleaned_up = phase5::cleanup(
        &prepared.workspace,
        &output_dir,
        &execution,
        &config.options,
        logger,
    )?;

    let (executed, manual_command) = match execution {
        phase5::Execution::Ran => (true, None),
        phase5::Execution::NothingToRender => (false, None),
        phase5::Execution::Manual(command) => (false, Some(command)),
    };

    Ok(RunReport {
        playbook: prepared.name,
        roles: prepared.roles,
        has_templates: prepared.has_templates,
        workspace: prepared.workspace.root,
        output_dir,
        executed,
        cleaned_up,
        manual_command,
    })
}

/// Run every configured playbook in order.
pub fn run_all(config: &Config, project: &Project, work_root: &Path, engine: &Engine) -> BatchReport {
    let mut report = BatchReport::default();

    for playbook_config in &config.playbooks {
        let logger = Logger::new(&playbook_config.name);
        logger.info(format!(
            "Preparing playbook with inventory {}",
            playbook_config.inventory
        ));

        match run_playbook(playbook_config, config, project, work_root, engine, &logger) {
            Ok(run) => report.runs.push(run),
            Err(error) => {
                logger.error(format!("Failed: {}", error));
                report.failures.push(PlaybookFailure {
                    playbook: playbook_config.name.clone(),
                    error,
                });
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InventoryKind, Options};
    use crate::engine::{InventoryLister, PlaybookInvocation, PlaybookRunner};
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    struct NoLister;

    impl InventoryLister for NoLister {
        fn list(&self, _source: &Path) -> Result<String> {
            Err(Error::internal("no dynamic inventories in these tests"))
        }
    }

    struct RecordingRunner(Rc<RefCell<Vec<PlaybookInvocation>>>);

    impl PlaybookRunner for RecordingRunner {
        fn run(&self, invocation: &PlaybookInvocation) -> Result<()> {
            self.0.borrow_mut().push(invocation.clone());
            Ok(())
        }
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn sample_project() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "site.yml", "- hosts: web\n  roles: [app]\n");
        write(root, "hosts", "[web]\nweb1 ansible_host=10.0.0.1\n");
        write(root, "roles/app/meta/main.yml", "dependencies: [base]\n");
        write(root, "roles/base/tasks/main.yml", "- debug: msg=base\n");
        write(
            root,
            "roles/app/tasks/main.yml",
            "- template: {src: app.conf.j2, dest: /etc/app/app.conf}\n  notify: restart\n",
        );
        write(root, "roles/app/templates/app.conf.j2", "port=80\n");
        temp
    }

    #[test]
    fn test_prepare_builds_workspace() {
        let project_dir = sample_project();
        let work = TempDir::new().unwrap();
        let project = Project::new(project_dir.path());
        let engine = Engine::with_operations(
            Box::new(NoLister),
            Box::new(RecordingRunner(Rc::default())),
        );

        let prepared = prepare(
            &PlaybookConfig {
                name: "site".to_string(),
                inventory: "hosts".to_string(),
                inventory_kind: InventoryKind::Auto,
            },
            &project,
            work.path(),
            &engine,
            &Logger::new("site"),
        )
        .unwrap();

        assert_eq!(prepared.roles, vec!["base", "app"]);
        assert!(prepared.has_templates);
        assert_eq!(prepared.playbook_file, "site.yml");
        assert_eq!(prepared.inventory, work.path().join("tmp-site/hosts"));
        assert!(fs::read_to_string(&prepared.inventory)
            .unwrap()
            .contains("ansible_connection=local"));
        let tasks =
            fs::read_to_string(prepared.workspace.roles_dir().join("app/tasks/main.yml")).unwrap();
        assert!(tasks.contains("render_config"));
        assert!(!tasks.contains("notify"));
    }

    #[test]
    fn test_run_all_scopes_failures_to_playbook() {
        let project_dir = sample_project();
        let work = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let project = Project::new(project_dir.path());
        let calls = Rc::new(RefCell::new(Vec::new()));
        let engine = Engine::with_operations(
            Box::new(NoLister),
            Box::new(RecordingRunner(Rc::clone(&calls))),
        );

        let config = Config {
            output_base_dir: Some(out.path().to_path_buf()),
            playbooks: vec![
                PlaybookConfig {
                    name: "missing".to_string(),
                    inventory: "hosts".to_string(),
                    inventory_kind: InventoryKind::Auto,
                },
                PlaybookConfig {
                    name: "site".to_string(),
                    inventory: "hosts".to_string(),
                    inventory_kind: InventoryKind::Auto,
                },
            ],
            options: Options::default(),
        };

        let report = run_all(&config, &project, work.path(), &engine);
        assert_eq!(report.total(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].playbook, "missing");
        assert!(report.failures[0].error.is_not_found());

        let run = &report.runs[0];
        assert!(run.executed);
        assert!(run.cleaned_up);
        assert_eq!(run.output_dir, out.path().join("site"));
        assert!(!work.path().join("tmp-site").exists());
        assert_eq!(calls.borrow().len(), 1);

        let err = report.into_result().unwrap_err();
        assert_eq!(err.to_string(), "1 of 2 playbooks failed");
    }

    #[test]
    fn test_generate_only_keeps_workspace() {
        let project_dir = sample_project();
        let work = TempDir::new().unwrap();
        let project = Project::new(project_dir.path());
        let calls = Rc::new(RefCell::new(Vec::new()));
        let engine = Engine::with_operations(
            Box::new(NoLister),
            Box::new(RecordingRunner(Rc::clone(&calls))),
        );

        let mut config = Config::single("site", "hosts", InventoryKind::Flat);
        config.options.generate_only = true;

        let runs = run_all(&config, &project, work.path(), &engine)
            .into_result()
            .unwrap();
        assert_eq!(runs.len(), 1);
        assert!(!runs[0].executed);
        assert!(!runs[0].cleaned_up);
        assert!(runs[0].manual_command.is_some());
        assert!(work.path().join("tmp-site/ansible.cfg").is_file());
        assert!(calls.borrow().is_empty());
    }
}
