//! Startup checks run once before the main loop: required-binary discovery
//! and the pre-flight build/test gate.

use std::process::Command;

use anyhow::{bail, Result};
use tracing::{info, warn};

use crate::build::BuildSystem;
use crate::config::OrchestratorConfig;

/// Verify that every binary the orchestrator needs resolves on PATH: the
/// agent command's executable, git, and the build toolchain (go or npm).
/// All missing binaries are reported in one combined error.
pub fn check_dependencies(cfg: &OrchestratorConfig) -> Result<()> {
    // Only the executable token matters; the agent command may carry args.
    let agent_binary = crate::agent::tokenize_command(cfg.agent_command.trim())
        .ok()
        .and_then(|tokens| tokens.into_iter().next())
        .unwrap_or_else(|| cfg.agent_command.clone());

    let toolchain = match cfg.build_system.as_str() {
        "npm" => "npm",
        _ => "go",
    };

    let required = [agent_binary.as_str(), "git", toolchain];
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|bin| !binary_on_path(bin))
        .collect();

    if !missing.is_empty() {
        bail!("missing required binaries on PATH: {}", missing.join(", "));
    }
    Ok(())
}

fn binary_on_path(binary: &str) -> bool {
    // A path-qualified command is checked directly, not searched.
    if binary.contains(std::path::MAIN_SEPARATOR) {
        return std::path::Path::new(binary).exists();
    }
    Command::new("which")
        .arg(binary)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Run a pre-flight build and test so the loop starts from a clean,
/// compilable state. Skipped with a warning when the build system is not
/// initialized (fresh checkout, dependencies never installed). Any failure
/// is fatal for the caller.
pub fn ensure_project_ready(build: &dyn BuildSystem, cfg: &OrchestratorConfig) -> Result<()> {
    if !build.is_initialized() {
        warn!(
            "project is not initialized (build system: {}) — skipping pre-flight build/test checks",
            cfg.build_system
        );
        return Ok(());
    }

    info!("running pre-flight build check");
    if let Err(err) = build.build() {
        bail!("pre-flight build failed:\n{err:#}");
    }
    crate::logging::success("pre-flight build passed");

    info!("running pre-flight test check");
    if let Err(err) = build.test() {
        bail!("pre-flight tests failed:\n{err:#}");
    }
    crate::logging::success("pre-flight tests passed");

    Ok(())
}
