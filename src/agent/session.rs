//! Session result file pre-creation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::templates;

/// Create the session file for a task attempt at
/// `{logs_dir}/sessions/{epic_id}/session-{task_id}_attempt-{attempt}.md`,
/// creating parent directories as needed.
///
/// The embedded session-result template is written with the `task_id` field
/// pre-filled, giving the agent a ready file to complete. Returns the path.
pub fn create_session_file(
    logs_dir: &Path,
    epic_id: &str,
    task_id: &str,
    attempt: u32,
) -> Result<PathBuf> {
    let dir = logs_dir.join("sessions").join(epic_id);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("create session directory {}", dir.display()))?;

    let path = dir.join(format!("session-{task_id}_attempt-{attempt}.md"));
    let content =
        templates::SESSION_RESULT.replace("task_id: \"\"", &format!("task_id: {task_id:?}"));

    std::fs::write(&path, content)
        .with_context(|| format!("write session file {}", path.display()))?;

    Ok(path)
}
