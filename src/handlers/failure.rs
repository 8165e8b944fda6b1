//! FAILURE outcome handler.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};

use crate::domain::{Status, TaskPointer, TaskType};
use crate::logging;
use crate::metrics;
use crate::orchestrator::{self, LoopContext};
use crate::state;

use super::success::rollback_with_warning;
use super::Dispatch;

/// Process a FAILURE outcome reported by the agent.
///
/// Below max_retries the failure is absorbed: rollback, record the metric,
/// warn, and let the loop try again. At max_retries the task is blocked:
/// the failure report is archived, the task is marked BLOCKED in tasks.yaml,
/// active_task becomes a manual_review pointer, and the handler goes Fatal
/// naming the task and the retry count.
pub fn handle_failure(ctx: &mut LoopContext<'_>) -> Dispatch {
    // 1. Rollback changes. Non-fatal; the decision below stands either way.
    rollback_with_warning(ctx);

    // 2. Record metrics.
    let duration = ctx.task_started.elapsed().as_secs();
    metrics::record_task_metrics(ctx.state, &ctx.task_id, "failure", duration);

    // 3a. Below max_retries — schedule a retry.
    if ctx.attempts < ctx.config.max_retries {
        logging::warning(&format!(
            "task {} failed (attempt {}/{}) — will retry",
            ctx.task_id, ctx.attempts, ctx.config.max_retries
        ));
        return Dispatch::Retry;
    }

    // 3b. Retries exhausted — block the task.
    logging::error(&format!(
        "task {} has failed {}/{} times — marking BLOCKED",
        ctx.task_id, ctx.attempts, ctx.config.max_retries
    ));

    if let Err(err) = archive_failure_report(ctx.logs_dir, &ctx.state.current_epic.id, &ctx.task_id)
    {
        warn!("failure archive skipped: {err:#}");
    }

    // Mark the task BLOCKED in tasks.yaml (skipped for synthetic tasks).
    if !ctx.task_type.is_synthetic() {
        if let Err(err) =
            orchestrator::update_task_status(ctx.tasks, &ctx.task_id, Status::Blocked)
        {
            warn!("could not mark task {} blocked: {err:#}", ctx.task_id);
        } else if let Err(err) = state::save_tasks(ctx.tasks_path, ctx.tasks) {
            warn!("could not save tasks after blocking task {}: {err}", ctx.task_id);
        }
    }

    // Hand the task to a human and persist that decision.
    ctx.state.active_task = TaskPointer {
        task_type: TaskType::ManualReview,
        id: ctx.task_id.clone(),
        attempts: 0,
    };
    if let Err(err) = state::save_project_state(ctx.state_path, ctx.state) {
        warn!("could not save state after setting manual review: {err}");
    }

    Dispatch::Fatal(anyhow!(
        "task {} blocked after {} attempts: requires manual review",
        ctx.task_id,
        ctx.attempts
    ))
}

/// Copy logs/ACTIVE_FAILURE.md to logs/failures/{epic}/failure-{task_id}.md.
/// A missing source file is a skipped step, reported as an error for the
/// caller to log as a warning.
fn archive_failure_report(logs_dir: &Path, epic_id: &str, task_id: &str) -> Result<()> {
    let src = logs_dir.join("ACTIVE_FAILURE.md");
    let data = match std::fs::read(&src) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(anyhow!("logs/ACTIVE_FAILURE.md not found — skipping archive"))
        }
        Err(err) => return Err(err).context("read ACTIVE_FAILURE.md"),
    };

    let dst = logs_dir
        .join("failures")
        .join(epic_id)
        .join(format!("failure-{task_id}.md"));
    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent).context("mkdir for failure archive")?;
    }
    std::fs::write(&dst, data).context("write failure archive")?;
    info!("failure report archived to {}", dst.display());
    Ok(())
}
