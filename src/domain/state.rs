//! Project-state document types: the orchestrator-owned side of the state.
//!
//! All timestamps are RFC3339 UTC strings. They stay `String` rather than
//! `chrono::DateTime` so zero-valued documents (`started_at: ""`) load and
//! round-trip unchanged; `validate_structure` owns the emptiness checks.

use serde::{Deserialize, Serialize};

use super::task::TaskType;

/// Reserved id for the synthetic KB synthesis (documentation) task.
pub const KB_UPDATE_ID: &str = "KB_UPDATE";

/// Prefix for synthetic bugfix task ids (`BUG-<interrupted task id>`).
pub const BUG_ID_PREFIX: &str = "BUG-";

/// The identity of a task pointer, with the user-defined vs synthetic
/// distinction lifted to the type level. Only `User` ids may be resolved
/// against the task list; the synthetic variants carry everything there is
/// to know about them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskIdentity<'a> {
    /// A task authored in tasks.yaml, referenced by its id.
    User(&'a str),
    /// An injected bugfix task; the id embeds the interrupted task's id.
    Bug(&'a str),
    /// The injected KB synthesis documentation task.
    KbSynthesis,
}

/// A lightweight reference to the active or next task.
///
/// `attempts` is meaningful only on `active_task`; serialization skips it
/// when zero so `next_task` never carries one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskPointer {
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub id: String,
    #[serde(skip_serializing_if = "attempts_is_zero")]
    pub attempts: u32,
}

fn attempts_is_zero(attempts: &u32) -> bool {
    *attempts == 0
}

impl TaskPointer {
    /// A pointer with no target, used to clear `next_task`.
    pub fn empty() -> Self {
        TaskPointer::default()
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }

    /// Classify this pointer. Bugfix pointers are `Bug`, documentation
    /// pointers are `KbSynthesis`, everything else is a user task id.
    pub fn identity(&self) -> TaskIdentity<'_> {
        match self.task_type {
            TaskType::Bugfix => TaskIdentity::Bug(&self.id),
            TaskType::Documentation => TaskIdentity::KbSynthesis,
            _ => TaskIdentity::User(&self.id),
        }
    }
}

/// The current_epic block in project-state.yaml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EpicState {
    pub id: String,
    pub name: String,
    pub branch_name: String,
    pub started_at: String,
    pub completed_at: Option<String>,
}

/// A metric record for one completed task attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskMetric {
    pub task_id: String,
    pub outcome: String,
    pub duration_seconds: u64,
    pub completed_at: String,
}

/// The metrics block in project-state.yaml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Metrics {
    pub total_tasks_completed: u64,
    pub total_duration_seconds: u64,
    pub tasks: Vec<TaskMetric>,
}

/// The full structure of project-state.yaml.
///
/// A `Default` value is the zero-valued document used when the file is
/// missing on startup; `bootstrap_from_tasks` fills it in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectState {
    pub current_epic: EpicState,
    pub active_task: TaskPointer,
    pub next_task: TaskPointer,
    pub kb_enabled: bool,
    pub metrics: Metrics,
}
