//! Structural validation and state/task drift detection.

use anyhow::{bail, Result};

use crate::domain::{ProjectState, Status, TaskPointer, Tasks};

/// Outcome of a state-sync check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// State and tasks are consistent; nothing was changed.
    Ok,
    /// The orchestrator redirected active_task to the only available open
    /// task. The caller should log the description as a warning.
    AutoCorrected { description: String },
}

/// Structural sanity check on the loaded documents, run before any
/// orchestration logic.
///
/// Fails when current_epic.id, active_task.type, or active_task.id is empty,
/// or when any task carries a status outside the four-value enumeration.
pub fn validate_structure(state: &ProjectState, tasks: &Tasks) -> Result<()> {
    if state.current_epic.id.is_empty() {
        bail!("project-state.yaml: current_epic.id is required but empty");
    }
    if state.active_task.task_type.is_empty() {
        bail!("project-state.yaml: active_task.type is required but empty");
    }
    if state.active_task.id.is_empty() {
        bail!("project-state.yaml: active_task.id is required but empty");
    }

    for task in &tasks.epic.tasks {
        if !task.status.is_valid() {
            bail!(
                "tasks.yaml: task {:?} has invalid status {:?} (must be TODO, IN_PROGRESS, DONE, or BLOCKED)",
                task.id,
                task.status.as_str()
            );
        }
    }
    Ok(())
}

/// Check that active_task.id refers to a real task in tasks.yaml, applying
/// the tiered recovery policy on a mismatch:
///
/// - id found in the list: `Ok`, no mutation.
/// - active task is synthetic: fatal — synthetic ids are never in the list,
///   so reaching this scan at all means the state is ambiguous.
/// - exactly one TODO/IN_PROGRESS candidate: redirect active_task to it
///   (preserving attempts) and report `AutoCorrected`.
/// - zero or several candidates: fatal, cannot auto-correct safely.
///
/// Callers skip this check entirely when the active task is synthetic.
pub fn validate_state_sync(state: &mut ProjectState, tasks: &Tasks) -> Result<ValidationResult> {
    if tasks.epic.tasks.iter().any(|t| t.id == state.active_task.id) {
        return Ok(ValidationResult::Ok);
    }

    if state.active_task.task_type.is_synthetic() {
        bail!(
            "active synthetic task {:?} (type {:?}) not found in tasks.yaml; state is ambiguous — manual correction required",
            state.active_task.id,
            state.active_task.task_type.as_str()
        );
    }

    let candidates: Vec<_> = tasks
        .epic
        .tasks
        .iter()
        .filter(|t| matches!(t.status, Status::Todo | Status::InProgress))
        .collect();

    if candidates.len() == 1 {
        let old = state.active_task.id.clone();
        state.active_task = TaskPointer {
            task_type: candidates[0].task_type.clone(),
            id: candidates[0].id.clone(),
            attempts: state.active_task.attempts,
        };
        return Ok(ValidationResult::AutoCorrected {
            description: format!(
                "active_task.id {:?} not found in tasks.yaml; redirected to {:?} (only available task)",
                old, state.active_task.id
            ),
        });
    }

    bail!(
        "active_task.id {:?} not found in tasks.yaml and {} candidate tasks remain (need exactly 1 for auto-correction)",
        state.active_task.id,
        candidates.len()
    );
}
