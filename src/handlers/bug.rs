//! BUG outcome handler: divert to a synthetic bugfix task, then resume.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};

use crate::domain::{TaskPointer, TaskType, BUG_ID_PREFIX};
use crate::logging;
use crate::metrics;
use crate::orchestrator::LoopContext;
use crate::state;

use super::success::rollback_with_warning;
use super::Dispatch;

/// Process a BUG outcome reported by the agent.
///
/// The nested-bug check runs before any side effects: a bugfix task that
/// itself reports BUG would divert forever. Otherwise the working tree is
/// rolled back, the bug report archived, and the state repointed so the
/// bugfix runs next with the interrupted task queued to resume after it.
pub fn handle_bug(ctx: &mut LoopContext<'_>) -> Dispatch {
    // 1. Nested bug check — before rollback, before anything.
    if ctx.task_type == TaskType::Bugfix {
        return Dispatch::Fatal(anyhow!(
            "nested bug detected: task {} (type {}) reported BUG; this would cause a death spiral — manual review required",
            ctx.task_id,
            ctx.task_type
        ));
    }

    // 2. Rollback changes. Non-fatal.
    rollback_with_warning(ctx);

    // 3. Record metrics.
    let duration = ctx.task_started.elapsed().as_secs();
    metrics::record_task_metrics(ctx.state, &ctx.task_id, "bug", duration);

    // 4. Generate the bug id.
    let bug_id = format!("{BUG_ID_PREFIX}{}", ctx.task_id);

    // 5. Archive the bug report (non-fatal).
    if let Err(err) = archive_bug_report(ctx.logs_dir, &ctx.state.current_epic.id, &ctx.task_id) {
        warn!("bug archive skipped: {err:#}");
    }

    // 6 & 7. Schedule the bugfix and queue the interrupted task as next.
    let interrupted_type = resolve_interrupted_type(ctx);
    ctx.state.active_task = TaskPointer {
        task_type: TaskType::Bugfix,
        id: bug_id.clone(),
        attempts: 0,
    };
    ctx.state.next_task = TaskPointer {
        task_type: interrupted_type,
        id: ctx.task_id.clone(),
        attempts: 0,
    };

    // 8. Persist updated state.
    if let Err(err) = state::save_project_state(ctx.state_path, ctx.state) {
        return Dispatch::Fatal(anyhow!("save state after bug scheduling: {err}"));
    }

    logging::warning(&format!(
        "task {} interrupted by bug — scheduled bugfix {bug_id}; will resume {} next",
        ctx.task_id, ctx.task_id
    ));
    Dispatch::Continue
}

/// Task type recorded in next_task for the interrupted task.
///
/// Synthetic tasks are typed from the loop context directly: they are never
/// in tasks.yaml, so a list lookup would always miss. User-defined tasks are
/// looked up by id; a miss falls back to the context type with a warning.
fn resolve_interrupted_type(ctx: &LoopContext<'_>) -> TaskType {
    if ctx.task_type.is_synthetic() {
        return ctx.task_type.clone();
    }
    if let Some(task) = ctx.tasks.find(&ctx.task_id) {
        return task.task_type.clone();
    }
    warn!(
        "task {} not found in tasks.yaml — using type {} for next_task",
        ctx.task_id, ctx.task_type
    );
    ctx.task_type.clone()
}

/// Copy logs/ACTIVE_BUG.md to logs/bugs/{epic}/bug-{task_id}.md. The archive
/// is keyed by the interrupted task's id so it correlates with user-visible
/// ids. A missing source file is a skipped step.
fn archive_bug_report(logs_dir: &Path, epic_id: &str, task_id: &str) -> Result<()> {
    let src = logs_dir.join("ACTIVE_BUG.md");
    let data = match std::fs::read(&src) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(anyhow!("logs/ACTIVE_BUG.md not found — skipping archive"))
        }
        Err(err) => return Err(err).context("read ACTIVE_BUG.md"),
    };

    let dst = logs_dir
        .join("bugs")
        .join(epic_id)
        .join(format!("bug-{task_id}.md"));
    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent).context("mkdir for bug archive")?;
    }
    std::fs::write(&dst, data).context("write bug archive")?;
    info!("bug report archived to {}", dst.display());
    Ok(())
}
