//! Node toolchain driver (npm).

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

use anyhow::anyhow;

use super::{run_capture, run_command, tail_lines, BuildSystem};

/// Projects without a real test suite print this marker from their test
/// script; the driver then reports success instead of a failure.
const NO_TESTS_MARKER: &str = "NO_TESTS_CONFIGURED";

/// Drives Node.js projects through npm.
#[derive(Debug)]
pub struct NpmBuildSystem {
    project_root: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PackageManifest {
    scripts: std::collections::HashMap<String, String>,
}

impl NpmBuildSystem {
    pub fn new(project_root: &Path) -> Self {
        NpmBuildSystem {
            project_root: project_root.to_path_buf(),
        }
    }

    /// Whether package.json declares a `scripts.test` entry.
    fn has_test_script(&self) -> bool {
        let Ok(data) = std::fs::read_to_string(self.project_root.join("package.json")) else {
            return false;
        };
        let Ok(manifest) = serde_json::from_str::<PackageManifest>(&data) else {
            return false;
        };
        manifest.scripts.contains_key("test")
    }
}

impl BuildSystem for NpmBuildSystem {
    fn install(&self) -> Result<()> {
        run_command("npm", &["install"], &self.project_root)?;
        Ok(())
    }

    fn build(&self) -> Result<()> {
        run_command("npm", &["run", "build"], &self.project_root)?;
        Ok(())
    }

    /// Runs `npm run test` only when a test script is configured. Output
    /// containing the NO_TESTS_CONFIGURED marker counts as success.
    fn test(&self) -> Result<()> {
        if !self.has_test_script() {
            return Ok(());
        }

        let (success, output) = run_capture("npm", &["run", "test"], &self.project_root)?;
        if output.contains(NO_TESTS_MARKER) {
            return Ok(());
        }
        if !success {
            return Err(anyhow!(
                "npm run test failed:\n{}",
                tail_lines(&output, super::OUTPUT_TAIL_LINES)
            ));
        }
        Ok(())
    }

    /// True when node_modules/ exists in the project root.
    fn is_initialized(&self) -> bool {
        self.project_root.join("node_modules").is_dir()
    }
}
