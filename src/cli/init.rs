//! Init command implementation: scaffold a new doug project.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::config;
use crate::logging;
use crate::templates;

/// Scaffold doug.yaml, tasks.yaml, PRD.md, and the embedded init assets in
/// `dir`. Refuses to touch an already-initialized project unless `force`.
pub fn init_command(dir: &Path, force: bool, build_system: Option<&str>) -> Result<()> {
    // Guard: refuse to re-initialize an existing project.
    if !force {
        for name in ["project-state.yaml", "tasks.yaml"] {
            if dir.join(name).exists() {
                bail!(
                    "{name} already exists — project appears to be already initialized; use --force to overwrite"
                );
            }
        }
    }

    // Build system: flag > marker-file auto-detection.
    let bs = match build_system {
        Some(bs) => bs,
        None => config::detect_build_system(dir),
    };

    let specs = [
        ("doug.yaml", doug_yaml_content(bs)),
        ("tasks.yaml", tasks_yaml_content()),
        ("PRD.md", prd_content()),
    ];

    for (name, content) in &specs {
        let path = dir.join(name);
        if !force && path.exists() {
            logging::warning(&format!(
                "{name} already exists — skipping (use --force to overwrite)"
            ));
            continue;
        }
        std::fs::write(&path, content).with_context(|| format!("write {name}"))?;
        logging::success(&format!("created {name}"));
    }

    copy_init_templates(dir, force)?;

    logging::info("project initialized — edit doug.yaml and tasks.yaml, then run: doug run");
    Ok(())
}

/// Copy the embedded init assets into the target project.
///
/// Destination mapping (no filename transformations):
///   - CLAUDE.md, AGENTS.md      → {dir}/
///   - *_TEMPLATE.md             → {dir}/logs/
///   - skills/**                 → {dir}/.claude/skills/
fn copy_init_templates(dir: &Path, force: bool) -> Result<()> {
    for file in templates::INIT_FILES {
        let rel = file.rel_path;
        let dst: PathBuf = if rel == "CLAUDE.md" || rel == "AGENTS.md" {
            dir.join(rel)
        } else if rel.ends_with("_TEMPLATE.md") {
            dir.join("logs").join(rel)
        } else if let Some(skill_rel) = rel.strip_prefix("skills/") {
            dir.join(".claude").join("skills").join(skill_rel)
        } else {
            // Unknown asset — skip silently.
            continue;
        };

        if !force && dst.exists() {
            logging::warning(&format!(
                "{} already exists — skipping (use --force to overwrite)",
                dst.display()
            ));
            continue;
        }

        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create directory for {}", dst.display()))?;
        }
        std::fs::write(&dst, file.content)
            .with_context(|| format!("write {}", dst.display()))?;
        logging::success(&format!("created {}", dst.display()));
    }
    Ok(())
}

/// doug.yaml content with inline comments and the build system pre-filled.
fn doug_yaml_content(build_system: &str) -> String {
    format!(
        r#"# doug.yaml — orchestrator configuration
agent_command: claude   # Command used to invoke the agent (e.g. claude, aider)
build_system: {build_system}        # Build system: go | npm (auto-detected by init; override here)
max_retries: 5          # Max FAILURE outcomes before a task is BLOCKED
max_iterations: 20      # Max loop iterations before the run exits
kb_enabled: true        # If false, skip KB synthesis task after features complete
"#
    )
}

/// Starter tasks.yaml with one example epic and two tasks.
fn tasks_yaml_content() -> String {
    r#"epic:
  id: "EPIC-1"
  name: "First Epic"
  tasks:
    - id: "EPIC-1-001"
      type: "feature"
      status: "TODO"
      description: "Implement the first feature of the project."
      acceptance_criteria:
        - "The feature is implemented and all related tests pass"
        - "Code follows the project's conventions and style guidelines"
    - id: "EPIC-1-002"
      type: "feature"
      status: "TODO"
      description: "Implement the second feature of the project."
      acceptance_criteria:
        - "The feature is implemented and all related tests pass"
        - "All acceptance criteria have been verified end-to-end"
"#
    .to_string()
}

/// Starter PRD.md template.
fn prd_content() -> String {
    r#"# PRD: [Project Name]

**Version**: 1.0
**Status**: Draft

---

## Problem

[Describe the problem this project solves and why it matters.]

---

## Goal

[What does success look like? What will this project produce?]

---

## Non-Goals

- [What is explicitly out of scope?]

---

## Epics

| Epic | Theme | Tasks | Depends On |
|------|-------|-------|------------|
| 1    | [Theme] | 2  | —          |

---

## Definition of Done

- [ ] All tasks are DONE
- [ ] Build passes
- [ ] Tests pass
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn scaffolds_config_tasks_prd_and_assets() {
        let tmp = TempDir::new().unwrap();
        init_command(tmp.path(), false, Some("npm")).unwrap();

        let cfg = std::fs::read_to_string(tmp.path().join("doug.yaml")).unwrap();
        assert!(cfg.contains("build_system: npm"));

        assert!(tmp.path().join("tasks.yaml").exists());
        assert!(tmp.path().join("PRD.md").exists());
        assert!(tmp.path().join("CLAUDE.md").exists());
        assert!(tmp.path().join("AGENTS.md").exists());
        assert!(tmp.path().join("logs/ACTIVE_BUG_TEMPLATE.md").exists());
        assert!(tmp.path().join("logs/ACTIVE_FAILURE_TEMPLATE.md").exists());
        assert!(tmp
            .path()
            .join(".claude/skills/implement-feature/SKILL.md")
            .exists());
        assert!(tmp
            .path()
            .join(".claude/skills/manual-review/SKILL.md")
            .exists());
    }

    #[test]
    fn starter_tasks_file_loads_cleanly() {
        let tmp = TempDir::new().unwrap();
        init_command(tmp.path(), false, None).unwrap();

        let tasks = crate::state::load_tasks(&tmp.path().join("tasks.yaml")).unwrap();
        assert_eq!(tasks.epic.id, "EPIC-1");
        assert_eq!(tasks.epic.tasks.len(), 2);
        assert!(tasks.epic.tasks.iter().all(|t| t.user_defined));
    }

    #[test]
    fn refuses_to_reinitialize_without_force() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("tasks.yaml"), "epic:\n").unwrap();

        let err = init_command(tmp.path(), false, None).unwrap_err();
        assert!(err.to_string().contains("already initialized"));

        init_command(tmp.path(), true, None).unwrap();
        let tasks = std::fs::read_to_string(tmp.path().join("tasks.yaml")).unwrap();
        assert!(tasks.contains("EPIC-1-001"), "--force overwrites");
    }

    #[test]
    fn existing_untracked_files_are_skipped_not_clobbered() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("PRD.md"), "my real PRD\n").unwrap();

        init_command(tmp.path(), false, None).unwrap();
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("PRD.md")).unwrap(),
            "my real PRD\n"
        );
    }
}
