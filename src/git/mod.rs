//! Git operations for the orchestrator: epic branch management, the
//! snapshot-preserving rollback, and staged commits.
//!
//! Git is invoked as an opaque external executable with explicit argument
//! vectors. The rollback is the engine's central durability mechanism: the
//! protected state files are held in memory across the hard reset, so the
//! orchestrator keeps its place even when the agent has mangled them.

use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};

/// Untracked paths that `git clean` must leave alone during rollback.
const CLEAN_EXCLUDES: &[&str] = &["logs/", "docs/kb/", ".env", "*.backup"];

/// Result of a commit attempt. `NothingToCommit` is the empty-change
/// sentinel; whether it counts as success is the caller's decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    NothingToCommit,
}

/// Ensure the working tree is on `branch_name`.
///
/// Already on it: no-op. Exists locally: check it out. Otherwise create and
/// check it out.
pub fn ensure_epic_branch(branch_name: &str, project_root: &Path) -> Result<()> {
    let current = current_branch(project_root).context("get current branch")?;
    if current == branch_name {
        return Ok(());
    }

    if branch_exists(branch_name, project_root)? {
        git_checked(project_root, &["checkout", branch_name])
            .with_context(|| format!("checkout branch {branch_name:?}"))?;
        return Ok(());
    }

    git_checked(project_root, &["checkout", "-b", branch_name])
        .with_context(|| format!("create branch {branch_name:?}"))?;
    Ok(())
}

/// Name of the currently checked-out branch.
pub fn current_branch(project_root: &Path) -> Result<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .current_dir(project_root)
        .output()
        .context("run git rev-parse")?;

    if !output.status.success() {
        bail!(
            "git rev-parse failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn branch_exists(branch_name: &str, project_root: &Path) -> Result<bool> {
    let output = Command::new("git")
        .args(["branch", "--list", branch_name])
        .current_dir(project_root)
        .output()
        .context("run git branch --list")?;

    if !output.status.success() {
        bail!(
            "git branch --list failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
}

/// Roll back the working tree while preserving `protected_paths` verbatim.
///
/// 1. Read each protected file into memory (missing files are skipped).
/// 2. `git reset --hard HEAD` to revert all tracked changes.
/// 3. Rewrite the backed-up files, recreating parent directories as needed.
/// 4. `git clean -fd` with the standing exclusion list.
///
/// The protected files keep whatever bytes the orchestrator last wrote, even
/// when those differ from the committed versions.
pub fn rollback_changes(project_root: &Path, protected_paths: &[&str]) -> Result<()> {
    let mut backups: Vec<(&str, Vec<u8>)> = Vec::with_capacity(protected_paths.len());
    for rel in protected_paths {
        match fs::read(project_root.join(rel)) {
            Ok(data) => backups.push((rel, data)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
            Err(err) => return Err(err).with_context(|| format!("backup {rel:?}")),
        }
    }

    git_checked(project_root, &["reset", "--hard", "HEAD"]).context("git reset --hard HEAD")?;

    for (rel, data) in &backups {
        let dst = project_root.join(rel);
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent).with_context(|| format!("mkdir for {rel:?}"))?;
        }
        fs::write(&dst, data).with_context(|| format!("restore {rel:?}"))?;
    }

    let mut clean_args = vec!["clean".to_string(), "-fd".to_string()];
    for exclude in CLEAN_EXCLUDES {
        clean_args.push(format!("--exclude={exclude}"));
    }
    let clean_refs: Vec<&str> = clean_args.iter().map(String::as_str).collect();
    git_checked(project_root, &clean_refs).context("git clean")?;

    Ok(())
}

/// Stage everything and commit with `message`.
///
/// Returns `CommitOutcome::NothingToCommit` when git reports an empty change
/// set; all other non-zero exits are errors.
pub fn commit(message: &str, project_root: &Path) -> Result<CommitOutcome> {
    git_checked(project_root, &["add", "-A"]).context("git add -A")?;

    let output = Command::new("git")
        .args(["commit", "-m", message])
        .current_dir(project_root)
        .output()
        .context("run git commit")?;

    if !output.status.success() {
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        if combined.contains("nothing to commit") || combined.contains("nothing added to commit") {
            return Ok(CommitOutcome::NothingToCommit);
        }
        bail!("git commit failed: {}", combined.trim());
    }
    Ok(CommitOutcome::Committed)
}

/// Run a git subcommand, failing with its combined output on non-zero exit.
fn git_checked(project_root: &Path, args: &[&str]) -> Result<()> {
    let output = Command::new("git")
        .args(args)
        .current_dir(project_root)
        .output()
        .with_context(|| format!("run git {}", args.join(" ")))?;

    if !output.status.success() {
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        bail!("git {} failed: {}", args.join(" "), combined.trim());
    }
    Ok(())
}
