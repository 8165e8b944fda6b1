//! SUCCESS outcome handler.

use anyhow::anyhow;
use chrono::{SecondsFormat, Utc};
use tracing::{error, info, warn};

use crate::changelog;
use crate::domain::{Status, TaskPointer, TaskType, KB_UPDATE_ID};
use crate::git::{self, CommitOutcome};
use crate::logging;
use crate::metrics;
use crate::orchestrator::{self, LoopContext};
use crate::state;

use super::{Dispatch, PROTECTED_PATHS};

/// Process a SUCCESS outcome reported by the agent.
///
/// Sequence (stopping at the first step that decides the dispatch):
///  1. Install dependencies the session result lists; failure → rollback, Retry.
///  2. Verify build; failure → rollback, Retry.
///  3. Verify tests; failure → rollback, Retry.
///  4. Record a success metric.
///  5. Update CHANGELOG.md (non-fatal; warning on error).
///  6. Mark a user-defined task DONE in tasks.yaml and save it.
///  7. Documentation task: set completed_at, save state, commit `docs:`,
///     return EpicComplete (commit trouble → Retry).
///  8. Otherwise inject KB synthesis or advance the task pointers.
///  9. Persist state.
/// 10. Commit; an empty change set counts as a failure here → Retry.
pub fn handle_success(ctx: &mut LoopContext<'_>) -> Dispatch {
    // 1. Install new dependencies if any were added by the agent.
    if !ctx.session_result.dependencies_added.is_empty() {
        info!(
            "installing new dependencies: {:?}",
            ctx.session_result.dependencies_added
        );
        if let Err(err) = ctx.build.install() {
            error!("dependency install failed: {err:#}");
            rollback_with_warning(ctx);
            return Dispatch::Retry;
        }
    }

    // 2. Verify build.
    info!("verifying build");
    if let Err(err) = ctx.build.build() {
        error!("build verification failed:\n{err:#}");
        rollback_with_warning(ctx);
        return Dispatch::Retry;
    }
    logging::success("build passed");

    // 3. Verify tests.
    info!("verifying tests");
    if let Err(err) = ctx.build.test() {
        error!("test verification failed:\n{err:#}");
        rollback_with_warning(ctx);
        return Dispatch::Retry;
    }
    logging::success("tests passed");

    // 4. Record task metrics.
    let duration = ctx.task_started.elapsed().as_secs();
    metrics::record_task_metrics(ctx.state, &ctx.task_id, "success", duration);

    // 5. Update CHANGELOG.md (non-fatal).
    if !ctx.session_result.changelog_entry.is_empty() {
        if let Err(err) = changelog::update_changelog(
            ctx.changelog_path,
            &ctx.session_result.changelog_entry,
            &ctx.task_type,
        ) {
            warn!("changelog update skipped: {err:#}");
        }
    }

    // 6. Mark user-defined task DONE (synthetic tasks are never in tasks.yaml).
    if !ctx.task_type.is_synthetic() {
        if let Err(err) = orchestrator::update_task_status(ctx.tasks, &ctx.task_id, Status::Done) {
            warn!("could not mark task {} done: {err:#}", ctx.task_id);
        }
        if let Err(err) = state::save_tasks(ctx.tasks_path, ctx.tasks) {
            return Dispatch::Fatal(anyhow!("save tasks after marking DONE: {err}"));
        }
    }

    // 7. Documentation (KB synthesis) task: stamp completion and finalize.
    if ctx.task_type == TaskType::Documentation {
        ctx.state.current_epic.completed_at =
            Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        if let Err(err) = state::save_project_state(ctx.state_path, ctx.state) {
            return Dispatch::Fatal(anyhow!("save state after docs completion: {err}"));
        }
        let message = format!("docs: {}", ctx.task_id);
        match git::commit(&message, ctx.project_root) {
            Ok(CommitOutcome::Committed) => return Dispatch::EpicComplete,
            Ok(CommitOutcome::NothingToCommit) => {
                warn!("git commit for docs task {} found nothing to commit", ctx.task_id);
                return Dispatch::Retry;
            }
            Err(err) => {
                warn!("git commit failed for docs task {}: {err:#}", ctx.task_id);
                return Dispatch::Retry;
            }
        }
    }

    // 8. Advance task pointers or inject KB synthesis.
    if orchestrator::needs_kb_synthesis(ctx.state, ctx.tasks) {
        info!("all feature tasks complete — scheduling KB synthesis");
        ctx.state.active_task = TaskPointer {
            task_type: TaskType::Documentation,
            id: KB_UPDATE_ID.into(),
            attempts: 0,
        };
        ctx.state.next_task = TaskPointer::empty();
    } else {
        orchestrator::advance_to_next_task(ctx.state, ctx.tasks);
    }

    // 9. Persist updated state.
    if let Err(err) = state::save_project_state(ctx.state_path, ctx.state) {
        return Dispatch::Fatal(anyhow!("save state: {err}"));
    }

    // 10. Commit all changes for this task. An empty change set means the
    // agent did nothing despite reporting SUCCESS — treated as a failure.
    let message = commit_message(&ctx.task_type, &ctx.task_id);
    match git::commit(&message, ctx.project_root) {
        Ok(CommitOutcome::Committed) => {}
        Ok(CommitOutcome::NothingToCommit) => {
            warn!("git commit for task {} found nothing to commit", ctx.task_id);
            return Dispatch::Retry;
        }
        Err(err) => {
            warn!("git commit failed for task {}: {err:#}", ctx.task_id);
            return Dispatch::Retry;
        }
    }

    logging::success(&format!("task {} committed", ctx.task_id));
    Dispatch::Continue
}

/// Conventional-commit message for the task type.
fn commit_message(task_type: &TaskType, task_id: &str) -> String {
    match task_type {
        TaskType::Bugfix => format!("fix: {task_id}"),
        TaskType::Documentation => format!("docs: {task_id}"),
        _ => format!("feat: {task_id}"),
    }
}

/// Rollback errors never mask the handler's own decision; they are logged
/// and the dispatch proceeds.
pub(super) fn rollback_with_warning(ctx: &LoopContext<'_>) {
    if let Err(err) = git::rollback_changes(ctx.project_root, PROTECTED_PATHS) {
        warn!("rollback failed: {err:#}");
    }
}
