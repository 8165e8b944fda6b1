//! Shared helpers for the end-to-end orchestrator tests.
//!
//! The mock agent is a shell script living outside the repository under
//! test (so rollbacks cannot delete it). On each invocation it reads
//! `logs/ACTIVE_TASK.md`, extracts the `**Session File**:` path, pops the
//! next outcome from `logs/outcomes.txt` (SUCCESS when the queue is empty),
//! and writes a minimal front-matter result. `logs/` survives both the
//! rollback's `git clean` exclusions and the commit cycle, making it a safe
//! home for the outcome queue.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use tempfile::TempDir;

/// The scripted mock agent.
pub const MOCK_AGENT_SCRIPT: &str = r#"#!/bin/sh
set -e
session=$(sed -n 's/^\*\*Session File\*\*: //p' logs/ACTIVE_TASK.md | head -n1)
if [ -s logs/outcomes.txt ]; then
  outcome=$(head -n1 logs/outcomes.txt)
  tail -n +2 logs/outcomes.txt > logs/outcomes.tmp && mv logs/outcomes.tmp logs/outcomes.txt
else
  outcome=SUCCESS
fi
printf -- '---\noutcome: %s\nchangelog_entry: ""\ndependencies_added: []\n---\n\n## Summary\n\nMock agent completed task.\n' "$outcome" > "$session"
"#;

/// Install a stub `go` binary (exit 0 for every subcommand) at the front of
/// PATH, once per test process. The orchestrator only needs the toolchain to
/// exist and succeed; the projects under test have nothing to compile.
pub fn ensure_stub_toolchain() {
    static STUB: OnceLock<PathBuf> = OnceLock::new();
    STUB.get_or_init(|| {
        let dir = TempDir::new().expect("stub toolchain dir");
        let go = dir.path().join("go");
        write_executable(&go, "#!/bin/sh\nexit 0\n");

        let old_path = std::env::var("PATH").unwrap_or_default();
        std::env::set_var("PATH", format!("{}:{old_path}", dir.path().display()));

        // Keep the directory alive for the life of the test process.
        let path = dir.path().to_path_buf();
        std::mem::forget(dir);
        path
    });
}

/// Write the mock agent script into `dir` and return its absolute path.
pub fn install_mock_agent(dir: &Path) -> PathBuf {
    let script = dir.join("mock-agent.sh");
    write_executable(&script, MOCK_AGENT_SCRIPT);
    script
}

fn write_executable(path: &Path, content: &str) {
    use std::os::unix::fs::PermissionsExt;
    std::fs::write(path, content).expect("write script");
    let mut perms = std::fs::metadata(path).expect("script metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).expect("chmod script");
}

/// Queue up the outcomes the mock agent will report, in order.
pub fn seed_outcomes(project: &Path, outcomes: &[&str]) {
    std::fs::create_dir_all(project.join("logs")).expect("create logs dir");
    let mut queue = outcomes.join("\n");
    queue.push('\n');
    std::fs::write(project.join("logs/outcomes.txt"), queue).expect("seed outcomes");
}

/// A zero-valued project-state.yaml so bootstrap runs on the first iteration.
pub fn zero_state_yaml(kb_enabled: bool) -> String {
    format!(
        r#"current_epic:
  id: ""
  name: ""
  branch_name: ""
  started_at: ""
active_task:
  type: ""
  id: ""
next_task:
  type: ""
  id: ""
kb_enabled: {kb_enabled}
metrics:
  total_tasks_completed: 0
  total_duration_seconds: 0
  tasks: []
"#
    )
}

/// A tasks.yaml with the given feature tasks, all TODO.
pub fn feature_tasks_yaml(epic_id: &str, task_ids: &[&str]) -> String {
    let mut yaml = format!("epic:\n  id: \"{epic_id}\"\n  name: \"Test Epic\"\n  tasks:\n");
    for id in task_ids {
        yaml.push_str(&format!(
            r#"    - id: "{id}"
      type: "feature"
      status: "TODO"
      description: "Test task {id}"
      acceptance_criteria:
        - "Task completes"
"#
        ));
    }
    yaml
}

/// Initialize a git repository in `dir` with repo-local user config and an
/// initial commit of all current files.
pub fn init_git_repo(dir: &Path) {
    for args in [
        vec!["init"],
        vec!["config", "user.email", "test@example.com"],
        vec!["config", "user.name", "Test"],
        vec!["add", "-A"],
        vec!["commit", "-m", "initial setup"],
    ] {
        let output = Command::new("git")
            .args(&args)
            .current_dir(dir)
            .output()
            .unwrap_or_else(|e| panic!("failed to run git {args:?}: {e}"));
        assert!(
            output.status.success(),
            "git {:?} failed:\n{}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

/// Commit subjects, newest first.
pub fn git_log(dir: &Path) -> Vec<String> {
    let output = Command::new("git")
        .args(["log", "--pretty=format:%s"])
        .current_dir(dir)
        .output()
        .expect("git log");
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}
