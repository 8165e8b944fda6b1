//! Outcome handlers for the orchestration loop.
//!
//! Each handler receives the iteration's `LoopContext` and performs the full
//! response sequence for one of the four agent outcomes. Handlers report
//! back through [`Dispatch`], which the main loop matches exhaustively.

mod bug;
mod epic;
mod failure;
mod success;

#[cfg(test)]
pub(crate) mod testutil;

pub use bug::handle_bug;
pub use epic::handle_epic_complete;
pub use failure::handle_failure;
pub use success::handle_success;

/// What the main loop should do after a handler returns.
#[derive(Debug)]
pub enum Dispatch {
    /// Normal forward progress; the task pointers were already updated.
    Continue,
    /// A non-fatal issue (build/test failure, commit failure, retryable
    /// FAILURE). Changes were rolled back; the loop tries again.
    Retry,
    /// The epic is done; the caller runs epic finalization and exits 0.
    EpicComplete,
    /// Unrecoverable; the caller surfaces the error and exits 1.
    Fatal(anyhow::Error),
}

/// State-tracking files preserved across every rollback so the orchestrator
/// never loses its place after a bad agent run.
pub(crate) const PROTECTED_PATHS: &[&str] = &["project-state.yaml", "tasks.yaml"];
