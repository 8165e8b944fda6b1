//! Idempotent CHANGELOG.md updates, done with in-memory string edits rather
//! than external tools.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::domain::TaskType;

/// CHANGELOG section header for a task type; `None` for types that never
/// produce changelog entries.
fn section_header(task_type: &TaskType) -> Option<&'static str> {
    match task_type {
        TaskType::Feature => Some("### Added"),
        TaskType::Bugfix => Some("### Fixed"),
        TaskType::Documentation => Some("### Changed"),
        _ => None,
    }
}

/// Insert `entry` as a bullet under the section for `task_type`, immediately
/// after the header's terminating newline.
///
/// Idempotent: if the literal bullet `- <entry>` already exists anywhere in
/// the file, nothing changes. An unknown task type or a missing section
/// header is an error the caller downgrades to a warning.
pub fn update_changelog(path: &Path, entry: &str, task_type: &TaskType) -> Result<()> {
    let Some(header) = section_header(task_type) else {
        bail!("unknown task type {task_type:?}; expected feature, bugfix, or documentation");
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read changelog {}", path.display()))?;

    let bullet = format!("- {entry}");
    if content.contains(&bullet) {
        return Ok(());
    }

    let Some(header_idx) = content.find(header) else {
        bail!("section {header:?} not found in {}", path.display());
    };

    let after_header = header_idx + header.len();
    let updated = match content[after_header..].find('\n') {
        // Insert right after the newline that terminates the header line.
        Some(nl_idx) => {
            let insert_at = after_header + nl_idx + 1;
            format!("{}{}\n{}", &content[..insert_at], bullet, &content[insert_at..])
        }
        // Header sits at the very end of the file with no trailing newline.
        None => format!("{content}\n{bullet}\n"),
    };

    std::fs::write(path, updated).with_context(|| format!("write changelog {}", path.display()))
}
