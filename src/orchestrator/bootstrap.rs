//! First-run bootstrap and the epic-level completion predicates.

use chrono::{SecondsFormat, Utc};

use crate::domain::{ProjectState, Status, TaskPointer, TaskType, Tasks};

/// Initialize project state from the task list on the first run. A no-op
/// when `current_epic.id` is already set, which makes it idempotent.
///
/// On first run it populates current_epic (id, name, branch_name,
/// started_at) and points active_task/next_task at the first and second list
/// entries (next_task stays empty for a single-task epic).
pub fn bootstrap_from_tasks(state: &mut ProjectState, tasks: &Tasks) {
    if !state.current_epic.id.is_empty() {
        return;
    }

    state.current_epic.id = tasks.epic.id.clone();
    state.current_epic.name = tasks.epic.name.clone();
    state.current_epic.branch_name = format!("feature/{}", tasks.epic.id);
    state.current_epic.started_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    if let Some(first) = tasks.epic.tasks.first() {
        state.active_task = TaskPointer {
            task_type: first.task_type.clone(),
            id: first.id.clone(),
            attempts: 0,
        };
    }
    if let Some(second) = tasks.epic.tasks.get(1) {
        state.next_task = TaskPointer {
            task_type: second.task_type.clone(),
            id: second.id.clone(),
            attempts: 0,
        };
    }
}

/// Whether a KB synthesis (documentation) task should be injected next.
///
/// False when kb is disabled, when KB synthesis is already the active task,
/// or while any user-defined task remains TODO or IN_PROGRESS.
pub fn needs_kb_synthesis(state: &ProjectState, tasks: &Tasks) -> bool {
    if !state.kb_enabled {
        return false;
    }
    if state.active_task.task_type == TaskType::Documentation {
        return false;
    }
    !tasks.epic.tasks.iter().any(|t| t.status.is_open())
}

/// Whether the current epic has no remaining work: every task is DONE and
/// either kb is disabled or KB synthesis already ran (active task is
/// documentation).
pub fn is_epic_already_complete(state: &ProjectState, tasks: &Tasks) -> bool {
    if tasks.epic.tasks.iter().any(|t| t.status != Status::Done) {
        return false;
    }
    if !state.kb_enabled {
        return true;
    }
    state.active_task.task_type == TaskType::Documentation
}
