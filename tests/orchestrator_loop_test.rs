//! End-to-end tests for the orchestration loop, driven by a scripted mock
//! agent against real git repositories.

mod common;

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use doug::cli::run::{run_command, RunOverrides};
use doug::domain::{Status, TaskType};
use doug::state::{load_project_state, load_tasks};

use common::{
    ensure_stub_toolchain, feature_tasks_yaml, git_log, init_git_repo, install_mock_agent,
    seed_outcomes, zero_state_yaml,
};

/// A scratch project plus the out-of-repo mock agent script.
struct Scenario {
    _project_dir: TempDir,
    _script_dir: TempDir,
    project: PathBuf,
    agent: PathBuf,
}

impl Scenario {
    fn new(kb_enabled: bool, task_ids: &[&str]) -> Self {
        ensure_stub_toolchain();

        let project_dir = TempDir::new().expect("project dir");
        let script_dir = TempDir::new().expect("script dir");
        let project = project_dir.path().to_path_buf();

        std::fs::write(
            project.join("project-state.yaml"),
            zero_state_yaml(kb_enabled),
        )
        .unwrap();
        std::fs::write(
            project.join("tasks.yaml"),
            feature_tasks_yaml("EPIC-1", task_ids),
        )
        .unwrap();
        init_git_repo(&project);

        let agent = install_mock_agent(script_dir.path());
        Scenario {
            project,
            agent,
            _project_dir: project_dir,
            _script_dir: script_dir,
        }
    }

    fn run(&self, max_retries: Option<u32>, max_iterations: Option<u32>) -> anyhow::Result<()> {
        run_command(
            &self.project,
            RunOverrides {
                agent: Some(self.agent.display().to_string()),
                build_system: Some("go".into()),
                max_retries,
                max_iterations,
                kb_enabled: None,
            },
        )
    }
}

fn commits_with_prefix(dir: &Path, prefix: &str) -> Vec<String> {
    git_log(dir)
        .into_iter()
        .filter(|subject| subject.starts_with(prefix))
        .collect()
}

#[test]
fn happy_path_two_features_kb_disabled() {
    let scenario = Scenario::new(false, &["EPIC-1-001", "EPIC-1-002"]);

    scenario.run(None, Some(2)).expect("run succeeds");

    let tasks = load_tasks(&scenario.project.join("tasks.yaml")).unwrap();
    assert!(tasks.epic.tasks.iter().all(|t| t.status == Status::Done));

    let feats = commits_with_prefix(&scenario.project, "feat: ");
    assert_eq!(
        feats.len(),
        2,
        "expected exactly two feat: commits, got {feats:?}"
    );
    assert!(feats.contains(&"feat: EPIC-1-001".to_string()));
    assert!(feats.contains(&"feat: EPIC-1-002".to_string()));
}

#[test]
fn failure_then_success_retries_within_budget() {
    let scenario = Scenario::new(true, &["EPIC-1-001"]);
    seed_outcomes(&scenario.project, &["FAILURE", "SUCCESS", "SUCCESS"]);

    // Attempt 1 fails, attempt 2 succeeds, then KB synthesis finishes the
    // epic. max_retries stays at the default of 5.
    scenario.run(None, Some(5)).expect("run succeeds");

    let tasks = load_tasks(&scenario.project.join("tasks.yaml")).unwrap();
    assert_eq!(tasks.epic.tasks[0].status, Status::Done);

    assert_eq!(
        commits_with_prefix(&scenario.project, "feat: ").len(),
        1,
        "one feat commit despite two attempts"
    );

    // One archived session file per attempt.
    let sessions = scenario.project.join("logs/sessions/EPIC-1");
    assert!(sessions.join("session-EPIC-1-001_attempt-1.md").exists());
    assert!(sessions.join("session-EPIC-1-001_attempt-2.md").exists());
}

#[test]
fn exhausted_retries_block_the_task_and_exit_nonzero() {
    let scenario = Scenario::new(false, &["EPIC-1-001"]);
    seed_outcomes(&scenario.project, &["FAILURE", "FAILURE"]);

    let err = scenario
        .run(Some(2), Some(10))
        .expect_err("blocked task is a fatal error");
    assert!(err.to_string().contains("manual review"));

    let tasks = load_tasks(&scenario.project.join("tasks.yaml")).unwrap();
    assert_eq!(tasks.epic.tasks[0].status, Status::Blocked);

    let state = load_project_state(&scenario.project.join("project-state.yaml")).unwrap();
    assert_eq!(state.active_task.task_type, TaskType::ManualReview);
    assert_eq!(state.active_task.id, "EPIC-1-001");
}

#[test]
fn bug_diversion_fixes_then_resumes_the_interrupted_task() {
    let scenario = Scenario::new(false, &["EPIC-1-001"]);
    seed_outcomes(&scenario.project, &["BUG", "SUCCESS", "SUCCESS"]);

    scenario.run(None, Some(3)).expect("run succeeds");

    let tasks = load_tasks(&scenario.project.join("tasks.yaml")).unwrap();
    assert_eq!(tasks.epic.tasks[0].status, Status::Done);

    let state = load_project_state(&scenario.project.join("project-state.yaml")).unwrap();
    assert_eq!(
        state.active_task.id, "EPIC-1-001",
        "interrupted task became active again after the fix"
    );

    assert_eq!(
        commits_with_prefix(&scenario.project, "fix: "),
        vec!["fix: BUG-EPIC-1-001".to_string()]
    );
    assert_eq!(
        commits_with_prefix(&scenario.project, "feat: "),
        vec!["feat: EPIC-1-001".to_string()]
    );
}

#[test]
fn nested_bug_is_fatal_without_touching_state() {
    let scenario = Scenario::new(false, &["EPIC-1-001"]);

    // Contrive a state where the bugfix task is already active.
    let state_yaml = r#"current_epic:
  id: "EPIC-1"
  name: "Test Epic"
  branch_name: "feature/EPIC-1"
  started_at: "2026-08-01T10:00:00Z"
active_task:
  type: "bugfix"
  id: "BUG-EPIC-1-001"
  attempts: 1
next_task:
  type: "feature"
  id: "EPIC-1-001"
kb_enabled: false
metrics:
  total_tasks_completed: 0
  total_duration_seconds: 0
  tasks: []
"#;
    std::fs::write(scenario.project.join("project-state.yaml"), state_yaml).unwrap();
    seed_outcomes(&scenario.project, &["BUG"]);

    let err = scenario.run(None, Some(5)).expect_err("nested bug is fatal");
    assert!(err.to_string().contains("nested bug"));

    let state = load_project_state(&scenario.project.join("project-state.yaml")).unwrap();
    assert_eq!(state.active_task.task_type, TaskType::Bugfix);
    assert_eq!(state.active_task.id, "BUG-EPIC-1-001", "active task unchanged");
}

#[test]
fn kb_synthesis_completes_the_epic() {
    let scenario = Scenario::new(true, &["EPIC-1-001", "EPIC-1-002"]);

    // Two feature successes, then the injected KB_UPDATE documentation task.
    scenario.run(None, Some(5)).expect("run succeeds");

    let state = load_project_state(&scenario.project.join("project-state.yaml")).unwrap();
    assert_eq!(state.active_task.task_type, TaskType::Documentation);
    assert_eq!(state.active_task.id, "KB_UPDATE");
    assert!(
        state.current_epic.completed_at.is_some(),
        "completed_at is stamped by the docs task"
    );

    let log = git_log(&scenario.project);
    assert!(log.contains(&"docs: KB_UPDATE".to_string()));

    // Re-running against the completed epic is a clean no-op exit.
    scenario.run(None, Some(5)).expect("second run exits clean");
}

#[test]
fn iteration_budget_exhaustion_is_a_clean_exit() {
    let scenario = Scenario::new(false, &["EPIC-1-001"]);
    seed_outcomes(&scenario.project, &["FAILURE", "FAILURE", "FAILURE"]);

    // Three failures, budget of three iterations, retries allowed up to ten:
    // the loop runs out of iterations without ever blocking the task.
    scenario.run(Some(10), Some(3)).expect("exit code 0");

    let tasks = load_tasks(&scenario.project.join("tasks.yaml")).unwrap();
    assert_eq!(tasks.epic.tasks[0].status, Status::Todo);

    let state = load_project_state(&scenario.project.join("project-state.yaml")).unwrap();
    assert_eq!(state.active_task.attempts, 3, "attempts persisted across iterations");
}
