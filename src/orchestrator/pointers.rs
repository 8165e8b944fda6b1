//! Active/next task pointer management.

use anyhow::{bail, Result};

use crate::domain::{ProjectState, Status, TaskPointer, TaskType, Tasks, KB_UPDATE_ID};

/// Align active_task and next_task with the current task-list statuses on
/// re-entry.
///
/// Selection for active: first IN_PROGRESS (interrupted mid-task), else
/// first TODO. When no user task remains and kb is enabled, the synthetic
/// KB_UPDATE documentation task is injected. next_task becomes the first
/// TODO after the selected active.
///
/// A synthetic active task is left untouched entirely: its pointer carries
/// state (a pending bugfix or KB run) that the task list cannot reproduce.
pub fn initialize_task_pointers(state: &mut ProjectState, tasks: &Tasks) {
    if state.active_task.task_type.is_synthetic() {
        return;
    }

    let active = tasks
        .epic
        .tasks
        .iter()
        .find(|t| t.status == Status::InProgress)
        .or_else(|| tasks.epic.tasks.iter().find(|t| t.status == Status::Todo));

    let Some(active) = active else {
        state.next_task = TaskPointer::empty();
        if state.kb_enabled {
            state.active_task = TaskPointer {
                task_type: TaskType::Documentation,
                id: KB_UPDATE_ID.into(),
                attempts: 0,
            };
        }
        return;
    };

    state.active_task = TaskPointer {
        task_type: active.task_type.clone(),
        id: active.id.clone(),
        attempts: 0,
    };
    state.next_task = first_todo_after(tasks, &active.id);
}

/// Promote next_task into active_task (attempts reset to zero) and find the
/// new next. Returns false without mutating when next_task is empty.
pub fn advance_to_next_task(state: &mut ProjectState, tasks: &Tasks) -> bool {
    if state.next_task.is_empty() {
        return false;
    }

    state.active_task = TaskPointer {
        task_type: state.next_task.task_type.clone(),
        id: state.next_task.id.clone(),
        attempts: 0,
    };
    state.next_task = first_todo_after(tasks, &state.active_task.id);
    true
}

/// The first TODO task appearing after `active_id` in list order, as a
/// pointer; empty when none remains.
fn first_todo_after(tasks: &Tasks, active_id: &str) -> TaskPointer {
    let mut found_active = false;
    for task in &tasks.epic.tasks {
        if found_active && task.status == Status::Todo {
            return TaskPointer {
                task_type: task.task_type.clone(),
                id: task.id.clone(),
                attempts: 0,
            };
        }
        if task.id == active_id {
            found_active = true;
        }
    }
    TaskPointer::empty()
}

/// Bump the attempt counter on the active task in memory; the caller
/// persists it before the agent runs so a crash cannot reset it.
pub fn increment_attempts(state: &mut ProjectState) {
    state.active_task.attempts += 1;
}

/// Set the status of the task with `id` in memory. Errors when the id is
/// not in the list; the caller persists via save_tasks.
pub fn update_task_status(tasks: &mut Tasks, id: &str, status: Status) -> Result<()> {
    match tasks.epic.tasks.iter_mut().find(|t| t.id == id) {
        Some(task) => {
            task.status = status;
            Ok(())
        }
        None => bail!("task {id:?} not found in tasks"),
    }
}
