//! Templates compiled into the binary.
//!
//! `runtime/` assets are used by the orchestrator itself (session file
//! pre-creation); `init/` assets are stamped into a new project by
//! `doug init` and never consumed at runtime.

/// Content of the pre-created session result file. `create_session_file`
/// substitutes the task id before writing it out.
pub const SESSION_RESULT: &str = include_str!("../../assets/runtime/session_result.md");

/// One file copied into a new project by `doug init`. The relative path is
/// interpreted by the init command's destination mapping.
pub struct InitFile {
    pub rel_path: &'static str,
    pub content: &'static str,
}

/// Files stamped into the target project by `doug init`:
/// agent briefs at the root, `*_TEMPLATE.md` under `logs/`, and the default
/// skill documents under `.claude/skills/`.
pub const INIT_FILES: &[InitFile] = &[
    InitFile {
        rel_path: "CLAUDE.md",
        content: include_str!("../../assets/init/CLAUDE.md"),
    },
    InitFile {
        rel_path: "AGENTS.md",
        content: include_str!("../../assets/init/AGENTS.md"),
    },
    InitFile {
        rel_path: "ACTIVE_BUG_TEMPLATE.md",
        content: include_str!("../../assets/init/ACTIVE_BUG_TEMPLATE.md"),
    },
    InitFile {
        rel_path: "ACTIVE_FAILURE_TEMPLATE.md",
        content: include_str!("../../assets/init/ACTIVE_FAILURE_TEMPLATE.md"),
    },
    InitFile {
        rel_path: "skills/implement-feature/SKILL.md",
        content: include_str!("../../assets/init/skills/implement-feature/SKILL.md"),
    },
    InitFile {
        rel_path: "skills/implement-bugfix/SKILL.md",
        content: include_str!("../../assets/init/skills/implement-bugfix/SKILL.md"),
    },
    InitFile {
        rel_path: "skills/implement-documentation/SKILL.md",
        content: include_str!("../../assets/init/skills/implement-documentation/SKILL.md"),
    },
    InitFile {
        rel_path: "skills/manual-review/SKILL.md",
        content: include_str!("../../assets/init/skills/manual-review/SKILL.md"),
    },
];
