//! Build-toolchain drivers.
//!
//! Each driver runs the project's install/build/test commands as child
//! processes with explicit argument vectors (no shell). On failure the error
//! carries the last 50 lines of the combined standard streams so callers can
//! surface them verbatim.

mod golang;
mod node;

pub use golang::GoBuildSystem;
pub use node::NpmBuildSystem;

use std::path::Path;
use std::process::Command;

use anyhow::{anyhow, bail, Context, Result};

/// Number of trailing output lines embedded in a failed-command error.
const OUTPUT_TAIL_LINES: usize = 50;

/// Lifecycle operations a project's build toolchain must support.
pub trait BuildSystem: std::fmt::Debug {
    /// Download or install project dependencies.
    fn install(&self) -> Result<()>;

    /// Compile the project.
    fn build(&self) -> Result<()>;

    /// Run the project's test suite.
    fn test(&self) -> Result<()>;

    /// Whether the build system has been initialized for the project.
    fn is_initialized(&self) -> bool;
}

/// Construct the driver for `build_system_type` ("go" or "npm"); any other
/// value fails fast with a descriptive error.
pub fn new_build_system(
    build_system_type: &str,
    project_root: &Path,
) -> Result<Box<dyn BuildSystem>> {
    match build_system_type {
        "go" => Ok(Box::new(GoBuildSystem::new(project_root))),
        "npm" => Ok(Box::new(NpmBuildSystem::new(project_root))),
        other => bail!("unknown build system type {other:?}: supported types are \"go\" and \"npm\""),
    }
}

/// Run `program args` in `dir`. A non-zero exit becomes an error carrying
/// the tail of the combined standard streams.
pub(crate) fn run_command(program: &str, args: &[&str], dir: &Path) -> Result<()> {
    let (success, combined) = run_capture(program, args, dir)?;
    if !success {
        return Err(anyhow!(
            "{program} {} failed:\n{}",
            args.join(" "),
            tail_lines(&combined, OUTPUT_TAIL_LINES)
        ));
    }
    Ok(())
}

/// Run `program args` in `dir`, returning the exit success flag and the
/// combined stdout + stderr for callers that inspect the output themselves.
pub(crate) fn run_capture(program: &str, args: &[&str], dir: &Path) -> Result<(bool, String)> {
    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()
        .with_context(|| format!("spawn {program} {}", args.join(" ")))?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    Ok((output.status.success(), combined))
}

/// The last `n` lines of `output`.
pub(crate) fn tail_lines(output: &str, n: usize) -> String {
    let lines: Vec<&str> = output.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}
