//! Orchestrator configuration, read from doug.yaml in the project root.
//!
//! A missing file yields defaults without error. Fields absent from the file
//! keep their defaults; present fields override them. CLI flags are applied
//! by the caller after loading, at the highest precedence, and only when the
//! user passed them explicitly.

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_AGENT_COMMAND: &str = "claude";
pub const DEFAULT_BUILD_SYSTEM: &str = "go";
pub const DEFAULT_MAX_RETRIES: u32 = 5;
pub const DEFAULT_MAX_ITERATIONS: u32 = 20;
pub const DEFAULT_KB_ENABLED: bool = true;

/// All configuration for the doug orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub agent_command: String,
    pub build_system: String,
    pub max_retries: u32,
    pub max_iterations: u32,
    pub kb_enabled: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        OrchestratorConfig {
            agent_command: DEFAULT_AGENT_COMMAND.to_string(),
            build_system: DEFAULT_BUILD_SYSTEM.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            kb_enabled: DEFAULT_KB_ENABLED,
        }
    }
}

/// Mirror of doug.yaml where every field is optional, distinguishing
/// "absent" from "explicitly set to the zero value".
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialConfig {
    agent_command: Option<String>,
    build_system: Option<String>,
    max_retries: Option<u32>,
    max_iterations: Option<u32>,
    kb_enabled: Option<bool>,
}

impl OrchestratorConfig {
    /// Load doug.yaml at `path`, merging present fields over defaults.
    /// A missing file returns defaults without error.
    pub fn load(path: &Path) -> Result<Self> {
        let mut cfg = OrchestratorConfig::default();

        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(cfg),
            Err(err) => {
                return Err(err).with_context(|| format!("read config file {}", path.display()))
            }
        };

        let partial: PartialConfig = serde_yaml::from_str(&data)
            .with_context(|| format!("parse config file {}", path.display()))?;

        if let Some(agent_command) = partial.agent_command {
            cfg.agent_command = agent_command;
        }
        if let Some(build_system) = partial.build_system {
            cfg.build_system = build_system;
        }
        if let Some(max_retries) = partial.max_retries {
            cfg.max_retries = max_retries;
        }
        if let Some(max_iterations) = partial.max_iterations {
            cfg.max_iterations = max_iterations;
        }
        if let Some(kb_enabled) = partial.kb_enabled {
            cfg.kb_enabled = kb_enabled;
        }

        Ok(cfg)
    }
}

/// Pick a build system from marker files in `dir`. go.mod wins over
/// package.json; neither present falls back to go.
pub fn detect_build_system(dir: &Path) -> &'static str {
    if dir.join("go.mod").exists() {
        return "go";
    }
    if dir.join("package.json").exists() {
        return "npm";
    }
    "go"
}
