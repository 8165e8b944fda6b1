//! Writes logs/ACTIVE_TASK.md, the per-iteration brief the agent reads, and
//! resolves the skill document for the active task type.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::domain::TaskType;

/// Parameters for one ACTIVE_TASK.md rendering.
pub struct ActiveTaskSpec<'a> {
    pub task_id: &'a str,
    pub task_type: &'a TaskType,
    /// Pre-created session file path the agent must write its result to.
    pub session_file_path: &'a Path,
    /// Directory holding ACTIVE_TASK.md and, for bugfix tasks, ACTIVE_BUG.md.
    pub logs_dir: &'a Path,
    /// Path to skills-config.yaml; skill files resolve relative to its parent.
    pub skills_config_path: &'a Path,
    /// Task description from tasks.yaml. Empty for synthetic tasks.
    pub description: &'a str,
    /// Acceptance criteria from tasks.yaml. Empty for synthetic tasks.
    pub acceptance_criteria: &'a [String],
    /// Current attempt number, already incremented for this iteration.
    pub attempts: u32,
    pub max_retries: u32,
}

/// Mirror of skills-config.yaml.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SkillsConfigFile {
    skill_mappings: HashMap<String, String>,
}

/// Default skill names used when skills-config.yaml is absent or does not
/// list the task type.
fn builtin_skill_name(task_type: &TaskType) -> Option<&'static str> {
    match task_type {
        TaskType::Feature => Some("implement-feature"),
        TaskType::Bugfix => Some("implement-bugfix"),
        TaskType::Documentation => Some("implement-documentation"),
        TaskType::ManualReview => Some("manual-review"),
        TaskType::Other(_) => None,
    }
}

/// Minimal fallback instructions used when the resolved SKILL.md file is
/// missing from disk.
fn builtin_skill_content(task_type: &TaskType) -> Option<&'static str> {
    match task_type {
        TaskType::Feature => Some(
            "# Feature Implementation\n\nImplement the feature described in tasks.yaml.\nFollow all instructions in CLAUDE.md.\nWrite your session summary to the session file path provided above.",
        ),
        TaskType::Bugfix => Some(
            "# Bug Fix\n\nFix the bug described in logs/ACTIVE_BUG.md.\nFollow all instructions in CLAUDE.md.\nWrite your session summary to the session file path provided above.",
        ),
        TaskType::Documentation => Some(
            "# Documentation Synthesis\n\nSynthesize session logs into documentation.\nFollow all instructions in CLAUDE.md.\nWrite your session summary to the session file path provided above.",
        ),
        TaskType::ManualReview => Some(
            "# Manual Review\n\nThis task requires human intervention.\nReview the current project state and provide guidance.",
        ),
        TaskType::Other(_) => None,
    }
}

/// Resolve the skill instructions for `task_type`.
///
/// 1. Read skills-config.yaml at `config_path` for the skill name; fall back
///    to the built-in name map when absent or unlisted.
/// 2. Read `{config_dir}/skills/{name}/SKILL.md`; fall back to the built-in
///    instructions with a warning when the file is missing.
pub fn skill_for_task_type(task_type: &TaskType, config_path: &Path) -> Result<String> {
    let skill_name = resolve_skill_name(task_type, config_path)?;

    let config_dir = config_path.parent().unwrap_or(Path::new("."));
    let skill_file = config_dir.join("skills").join(&skill_name).join("SKILL.md");

    match std::fs::read_to_string(&skill_file) {
        Ok(content) => Ok(content),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!(
                "skill file not found at {}, using built-in fallback",
                skill_file.display()
            );
            match builtin_skill_content(task_type) {
                Some(fallback) => Ok(fallback.to_string()),
                // resolve_skill_name already validated the type; guard anyway.
                None => bail!("no fallback content for task type {task_type:?}"),
            }
        }
        Err(err) => {
            Err(err).with_context(|| format!("read skill file {}", skill_file.display()))
        }
    }
}

fn resolve_skill_name(task_type: &TaskType, config_path: &Path) -> Result<String> {
    if let Ok(data) = std::fs::read_to_string(config_path) {
        if let Ok(cfg) = serde_yaml::from_str::<SkillsConfigFile>(&data) {
            if let Some(name) = cfg.skill_mappings.get(task_type.as_str()) {
                if !name.is_empty() {
                    return Ok(name.clone());
                }
            }
        }
    }

    match builtin_skill_name(task_type) {
        Some(name) => Ok(name.to_string()),
        None => bail!("unknown task type {task_type:?}: no skill mapping found"),
    }
}

/// Write logs/ACTIVE_TASK.md with the task metadata and skill instructions.
/// The file is overwritten every iteration and never archived.
///
/// For bugfix tasks the content of logs/ACTIVE_BUG.md is appended as a
/// "Bug Context" section; a missing bug file is a logged warning, not an
/// error.
pub fn write_active_task(spec: &ActiveTaskSpec<'_>) -> Result<()> {
    let skill_content = skill_for_task_type(spec.task_type, spec.skills_config_path)
        .with_context(|| format!("get skill for task type {:?}", spec.task_type))?;

    let mut brief = String::new();
    brief.push_str("# Active Task\n\n");
    brief.push_str(&format!("**Task ID**: {}\n", spec.task_id));
    brief.push_str(&format!("**Task Type**: {}\n", spec.task_type));
    brief.push_str(&format!(
        "**Session File**: {}\n",
        spec.session_file_path.display()
    ));
    brief.push_str(&format!(
        "**Attempt**: {} of {}\n",
        spec.attempts, spec.max_retries
    ));
    if !spec.description.is_empty() {
        brief.push_str(&format!("**Description**: {}\n", spec.description));
    }
    if !spec.acceptance_criteria.is_empty() {
        brief.push_str("\n**Acceptance Criteria**:\n");
        for criterion in spec.acceptance_criteria {
            brief.push_str(&format!("- {criterion}\n"));
        }
    }

    brief.push_str("# Skill to Use\n\n");
    brief.push_str("\n---\n\n");
    brief.push_str(&skill_content);

    if *spec.task_type == TaskType::Bugfix {
        match std::fs::read_to_string(spec.logs_dir.join("ACTIVE_BUG.md")) {
            Ok(bug_content) => {
                brief.push_str("\n\n---\n\n## Bug Context\n\n");
                brief.push_str(&bug_content);
            }
            Err(err) => warn!("bug context unavailable: {err}"),
        }
    }

    std::fs::create_dir_all(spec.logs_dir)
        .with_context(|| format!("create logs directory {}", spec.logs_dir.display()))?;
    let out_path = spec.logs_dir.join("ACTIVE_TASK.md");
    std::fs::write(&out_path, brief)
        .with_context(|| format!("write {}", out_path.display()))?;

    Ok(())
}
