//! EPIC_COMPLETE handler: summary, finalization commit, banner.

use anyhow::{Context, Result};
use tracing::info;

use crate::git::{self, CommitOutcome};
use crate::logging;
use crate::metrics;
use crate::orchestrator::LoopContext;

/// Finalize the epic after the KB synthesis task succeeds (or when the agent
/// reports EPIC_COMPLETE directly).
///
/// Residual changes are staged and committed as `chore: finalize <epicId>`.
/// An empty change set is success here — everything was already committed by
/// the per-task handlers; any other commit failure is fatal and must surface
/// as a non-zero exit.
pub fn handle_epic_complete(ctx: &mut LoopContext<'_>) -> Result<()> {
    // 1. Metrics summary for the completed epic.
    metrics::print_epic_summary(ctx.state);

    // 2. Commit any remaining changes with the finalization message.
    let epic_id = ctx.state.current_epic.id.clone();
    let message = format!("chore: finalize {epic_id}");
    match git::commit(&message, ctx.project_root)
        .with_context(|| format!("git commit failed finalizing {epic_id}"))?
    {
        CommitOutcome::Committed => {}
        CommitOutcome::NothingToCommit => {
            info!("no new changes to commit for {epic_id} finalization");
        }
    }

    // 3. Completion banner.
    logging::section(&format!("EPIC {epic_id} COMPLETE"));
    logging::success(&format!(
        "epic {epic_id} ({}) completed successfully",
        ctx.state.current_epic.name
    ));

    Ok(())
}
