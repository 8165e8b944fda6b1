//! Go toolchain driver.

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::{run_command, BuildSystem};

/// Drives Go projects through the go toolchain.
#[derive(Debug)]
pub struct GoBuildSystem {
    project_root: PathBuf,
}

impl GoBuildSystem {
    pub fn new(project_root: &Path) -> Self {
        GoBuildSystem {
            project_root: project_root.to_path_buf(),
        }
    }
}

impl BuildSystem for GoBuildSystem {
    fn install(&self) -> Result<()> {
        run_command("go", &["mod", "download"], &self.project_root)?;
        Ok(())
    }

    fn build(&self) -> Result<()> {
        run_command("go", &["build", "./..."], &self.project_root)?;
        Ok(())
    }

    fn test(&self) -> Result<()> {
        run_command("go", &["test", "./..."], &self.project_root)?;
        Ok(())
    }

    /// True when go.sum exists in the project root.
    fn is_initialized(&self) -> bool {
        self.project_root.join("go.sum").exists()
    }
}
