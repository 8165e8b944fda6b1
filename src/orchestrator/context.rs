//! Per-iteration context handed to the outcome handlers.

use std::path::Path;
use std::time::Instant;

use crate::build::BuildSystem;
use crate::config::OrchestratorConfig;
use crate::domain::{ProjectState, SessionResult, TaskType, Tasks};

/// Everything one iteration of the main loop knows, bundled so the four
/// outcome handlers need no further parameters.
///
/// `task_id`, `task_type`, and `attempts` are snapshots taken after the
/// attempt increment; the handlers may repoint `state.active_task` while the
/// snapshot still names the task the agent just worked on.
pub struct LoopContext<'a> {
    // Per-iteration identity.
    pub task_id: String,
    pub task_type: TaskType,
    pub attempts: u32,

    /// Agent output parsed from the session file (or the synthetic FAILURE
    /// substituted on a parse error).
    pub session_result: SessionResult,

    pub config: &'a OrchestratorConfig,
    pub build: &'a dyn BuildSystem,

    /// Wall-clock start of this iteration, for metric durations.
    pub task_started: Instant,

    // Mutable shared state; handlers mutate in memory and persist.
    pub state: &'a mut ProjectState,
    pub tasks: &'a mut Tasks,

    // File-system layout, all rooted in the working copy.
    pub project_root: &'a Path,
    pub state_path: &'a Path,
    pub tasks_path: &'a Path,
    pub logs_dir: &'a Path,
    pub changelog_path: &'a Path,
}
