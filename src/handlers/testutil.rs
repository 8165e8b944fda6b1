//! Shared fixtures for handler tests: a scratch git repository seeded with
//! the two state documents, a scriptable build stub, and a context builder.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use anyhow::{anyhow, Result};
use tempfile::TempDir;

use crate::build::BuildSystem;
use crate::config::OrchestratorConfig;
use crate::domain::{
    Outcome, ProjectState, SessionResult, Status, Task, TaskPointer, TaskType, Tasks,
};
use crate::orchestrator::LoopContext;

/// Build stub whose three operations fail on demand.
#[derive(Debug, Default)]
pub struct StubBuild {
    pub fail_install: bool,
    pub fail_build: bool,
    pub fail_test: bool,
}

impl BuildSystem for StubBuild {
    fn install(&self) -> Result<()> {
        if self.fail_install {
            return Err(anyhow!("install failed (stub)"));
        }
        Ok(())
    }
    fn build(&self) -> Result<()> {
        if self.fail_build {
            return Err(anyhow!("build failed (stub)"));
        }
        Ok(())
    }
    fn test(&self) -> Result<()> {
        if self.fail_test {
            return Err(anyhow!("tests failed (stub)"));
        }
        Ok(())
    }
    fn is_initialized(&self) -> bool {
        true
    }
}

pub struct Fixture {
    tmp: TempDir,
    pub state: ProjectState,
    pub tasks: Tasks,
    pub config: OrchestratorConfig,
    pub build: StubBuild,
    state_path: PathBuf,
    tasks_path: PathBuf,
    logs_dir: PathBuf,
    changelog_path: PathBuf,
}

impl Fixture {
    /// A two-feature epic (EPIC-1-001, EPIC-1-002, both TODO) with the first
    /// task active on attempt 1, inside a committed git repository.
    pub fn two_feature_epic() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let root = tmp.path().to_path_buf();

        let mut tasks = Tasks::default();
        tasks.epic.id = "EPIC-1".into();
        tasks.epic.name = "First Epic".into();
        tasks.epic.tasks = vec![
            Task {
                id: "EPIC-1-001".into(),
                task_type: TaskType::Feature,
                status: Status::Todo,
                description: "First feature".into(),
                acceptance_criteria: vec!["It works".into()],
                user_defined: true,
            },
            Task {
                id: "EPIC-1-002".into(),
                task_type: TaskType::Feature,
                status: Status::Todo,
                description: "Second feature".into(),
                acceptance_criteria: vec![],
                user_defined: true,
            },
        ];

        let mut state = ProjectState::default();
        state.current_epic.id = "EPIC-1".into();
        state.current_epic.name = "First Epic".into();
        state.current_epic.branch_name = "feature/EPIC-1".into();
        state.current_epic.started_at = "2026-08-01T10:00:00Z".into();
        state.kb_enabled = true;
        state.active_task = TaskPointer {
            task_type: TaskType::Feature,
            id: "EPIC-1-001".into(),
            attempts: 1,
        };
        state.next_task = TaskPointer {
            task_type: TaskType::Feature,
            id: "EPIC-1-002".into(),
            attempts: 0,
        };

        let fixture = Fixture {
            state_path: root.join("project-state.yaml"),
            tasks_path: root.join("tasks.yaml"),
            logs_dir: root.join("logs"),
            changelog_path: root.join("CHANGELOG.md"),
            tmp,
            state,
            tasks,
            config: OrchestratorConfig::default(),
            build: StubBuild::default(),
        };

        crate::state::save_project_state(&fixture.state_path, &fixture.state).unwrap();
        crate::state::save_tasks(&fixture.tasks_path, &fixture.tasks).unwrap();

        fixture.git(&["init"]);
        fixture.git(&["config", "user.email", "test@example.com"]);
        fixture.git(&["config", "user.name", "Test User"]);
        fixture.git(&["add", "-A"]);
        fixture.git(&["commit", "-m", "initial setup"]);
        fixture
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn state_path(&self) -> PathBuf {
        self.state_path.clone()
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.tasks_path.clone()
    }

    /// Build a loop context for the active task with the given outcome.
    pub fn ctx(&mut self, outcome: Outcome) -> LoopContext<'_> {
        LoopContext {
            task_id: self.state.active_task.id.clone(),
            task_type: self.state.active_task.task_type.clone(),
            attempts: self.state.active_task.attempts,
            session_result: SessionResult {
                outcome,
                changelog_entry: String::new(),
                dependencies_added: Vec::new(),
            },
            config: &self.config,
            build: &self.build,
            task_started: Instant::now(),
            state: &mut self.state,
            tasks: &mut self.tasks,
            project_root: self.tmp.path(),
            state_path: &self.state_path,
            tasks_path: &self.tasks_path,
            logs_dir: &self.logs_dir,
            changelog_path: &self.changelog_path,
        }
    }

    pub fn commit_everything(&self, message: &str) {
        self.git(&["add", "-A"]);
        self.git(&["commit", "-m", message]);
    }

    pub fn git_log(&self) -> String {
        let output = Command::new("git")
            .args(["log", "--pretty=format:%s"])
            .current_dir(self.tmp.path())
            .output()
            .expect("git log");
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    pub fn git(&self, args: &[&str]) {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.tmp.path())
            .output()
            .unwrap_or_else(|e| panic!("failed to run git {:?}: {}", args, e));
        assert!(
            output.status.success(),
            "git {:?} failed:\nstdout:\n{}\nstderr:\n{}",
            args,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
}
