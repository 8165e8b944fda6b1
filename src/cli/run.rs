//! Run command implementation: the startup sequence and the bounded
//! orchestration loop.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::agent;
use crate::build;
use crate::config::OrchestratorConfig;
use crate::domain::{Outcome, ProjectState, SessionResult};
use crate::git;
use crate::handlers::{
    handle_bug, handle_epic_complete, handle_failure, handle_success, Dispatch,
};
use crate::logging;
use crate::orchestrator::{self, LoopContext, ValidationResult};
use crate::state::{self, StateError};

/// CLI flag values that override doug.yaml settings. `None` means the flag
/// was not passed; the config file (or its default) stands.
#[derive(Debug, Default)]
pub struct RunOverrides {
    pub agent: Option<String>,
    pub build_system: Option<String>,
    pub max_retries: Option<u32>,
    pub max_iterations: Option<u32>,
    pub kb_enabled: Option<bool>,
}

/// Run the orchestration loop for the project rooted at `work_dir`.
///
/// Returns `Ok(())` on epic completion or clean exhaustion of the iteration
/// budget; any error maps to exit code 1 in `main`.
pub fn run_command(work_dir: &Path, overrides: RunOverrides) -> Result<()> {
    let project_root = work_dir;

    // Load config; a missing doug.yaml yields defaults. Explicit CLI flags
    // take the highest precedence.
    let mut cfg = OrchestratorConfig::load(&project_root.join("doug.yaml"))
        .context("load config")?;
    if let Some(agent_command) = overrides.agent {
        cfg.agent_command = agent_command;
    }
    if let Some(build_system) = overrides.build_system {
        cfg.build_system = build_system;
    }
    if let Some(max_retries) = overrides.max_retries {
        cfg.max_retries = max_retries;
    }
    if let Some(max_iterations) = overrides.max_iterations {
        cfg.max_iterations = max_iterations;
    }
    if let Some(kb_enabled) = overrides.kb_enabled {
        cfg.kb_enabled = kb_enabled;
    }

    // Verify required binaries before doing any work.
    orchestrator::check_dependencies(&cfg).context("dependency check failed")?;

    // Load the two state documents. A missing project state is the first
    // run: start from the zero-valued document so bootstrap can fill it in,
    // seeding kb_enabled from the effective config.
    let state_path = project_root.join("project-state.yaml");
    let tasks_path = project_root.join("tasks.yaml");

    let mut project_state = match state::load_project_state(&state_path) {
        Ok(loaded) => loaded,
        Err(StateError::NotFound { .. }) => {
            info!("no project-state.yaml yet — bootstrapping from tasks.yaml");
            let mut fresh = ProjectState::default();
            fresh.kb_enabled = cfg.kb_enabled;
            fresh
        }
        Err(err) => return Err(err).context("load project state"),
    };
    let mut tasks = state::load_tasks(&tasks_path).context("load tasks")?;

    // Bootstrap on first run (no-op when current_epic.id is already set).
    orchestrator::bootstrap_from_tasks(&mut project_state, &tasks);

    // Nothing left to do: exit 0 without touching the working copy.
    if orchestrator::is_epic_already_complete(&project_state, &tasks) {
        logging::success("all tasks already DONE — nothing to do");
        return Ok(());
    }

    let build = build::new_build_system(&cfg.build_system, project_root)
        .context("build system")?;

    // Pre-flight build/test gate (skipped when not initialized).
    orchestrator::ensure_project_ready(build.as_ref(), &cfg)
        .context("pre-flight check failed")?;

    orchestrator::validate_structure(&project_state, &tasks)
        .context("YAML structure invalid")?;

    git::ensure_epic_branch(&project_state.current_epic.branch_name, project_root)
        .context("ensure epic branch")?;

    orchestrator::initialize_task_pointers(&mut project_state, &tasks);

    // State/task drift check. Synthetic tasks are never in tasks.yaml by
    // design; running the check for them would always go fatal.
    if !project_state.active_task.task_type.is_synthetic() {
        match orchestrator::validate_state_sync(&mut project_state, &tasks)
            .context("state sync validation failed")?
        {
            ValidationResult::Ok => {}
            ValidationResult::AutoCorrected { description } => logging::warning(&description),
        }
    }

    // Persist bootstrapped / pointer-initialized state before the loop.
    state::save_project_state(&state_path, &project_state)
        .context("save initial project state")?;

    let logs_dir = project_root.join("logs");
    let changelog_path = project_root.join("CHANGELOG.md");
    let skills_config_path = project_root.join(".claude").join("skills-config.yaml");

    for iteration in 0..cfg.max_iterations {
        logging::section(&format!(
            "ITERATION {} — task {}",
            iteration + 1,
            project_state.active_task.id
        ));
        let task_started = Instant::now();

        // Attempts are incremented and persisted before the agent runs, so
        // a crash mid-run cannot reset the counter.
        orchestrator::increment_attempts(&mut project_state);
        let task_id = project_state.active_task.id.clone();
        let task_type = project_state.active_task.task_type.clone();
        let attempts = project_state.active_task.attempts;

        state::save_project_state(&state_path, &project_state)
            .context("save state before agent invocation")?;

        let session_path = agent::create_session_file(
            &logs_dir,
            &project_state.current_epic.id,
            &task_id,
            attempts,
        )
        .context("create session file")?;

        // Description and acceptance criteria exist only for user-defined
        // tasks; synthetic pointers resolve to nothing by construction.
        let (description, criteria) = match tasks.find_pointer(&project_state.active_task) {
            Some(task) => (task.description.clone(), task.acceptance_criteria.clone()),
            None => (String::new(), Vec::new()),
        };

        agent::write_active_task(&agent::ActiveTaskSpec {
            task_id: &task_id,
            task_type: &task_type,
            session_file_path: &session_path,
            logs_dir: &logs_dir,
            skills_config_path: &skills_config_path,
            description: &description,
            acceptance_criteria: &criteria,
            attempts,
            max_retries: cfg.max_retries,
        })
        .context("write active task")?;

        // Invoke the agent. A non-zero exit is a warning, not a decision:
        // the session result file is the authoritative outcome.
        info!("invoking agent for task {task_id} (attempt {attempts})");
        if let Err(agent_err) = agent::run_agent(&cfg.agent_command, project_root) {
            warn!("agent exited with error: {agent_err:#} — reading session result anyway");
        }

        let session_result = match agent::parse_session_result(&session_path) {
            Ok(result) => result,
            Err(parse_err) => {
                error!(
                    "failed to parse session result from {}: {parse_err} — treating as FAILURE",
                    session_path.display()
                );
                SessionResult::failure()
            }
        };
        info!("session outcome: {}", session_result.outcome);

        let mut ctx = LoopContext {
            task_id,
            task_type,
            attempts,
            session_result,
            config: &cfg,
            build: build.as_ref(),
            task_started,
            state: &mut project_state,
            tasks: &mut tasks,
            project_root,
            state_path: &state_path,
            tasks_path: &tasks_path,
            logs_dir: &logs_dir,
            changelog_path: &changelog_path,
        };

        let outcome = ctx.session_result.outcome;
        let dispatch = match outcome {
            Outcome::Success => handle_success(&mut ctx),
            Outcome::Failure => handle_failure(&mut ctx),
            Outcome::Bug => handle_bug(&mut ctx),
            Outcome::EpicComplete => Dispatch::EpicComplete,
        };

        match dispatch {
            // Forward progress or an absorbed failure: next iteration.
            Dispatch::Continue | Dispatch::Retry => {}
            Dispatch::EpicComplete => {
                handle_epic_complete(&mut ctx).context("epic finalization failed")?;
                return Ok(());
            }
            Dispatch::Fatal(err) => return Err(err),
        }
    }

    // Exhausting the iteration budget is a clean exit, not an error.
    logging::warning(&format!(
        "max iterations ({}) reached — exiting",
        cfg.max_iterations
    ));
    Ok(())
}
