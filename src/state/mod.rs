//! Atomic load and save operations for the two orchestrator state files:
//! project-state.yaml and tasks.yaml.
//!
//! All writes are atomic: the document is serialized in memory, written to a
//! `.tmp` file in the same directory, then renamed over the target in a
//! single call. Observers see the old bytes or the new bytes, never a
//! partial merge.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::{ProjectState, Tasks};

/// Error kinds for state-file I/O. `NotFound` is distinct from `Parse` so
/// callers can substitute a zero-valued document on first run.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("state file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

/// Read project-state.yaml at `path`.
/// Returns `StateError::NotFound` if the file is absent, `StateError::Parse`
/// on malformed YAML.
pub fn load_project_state(path: &Path) -> Result<ProjectState, StateError> {
    let data = read_file(path)?;
    serde_yaml::from_str(&data).map_err(|source| StateError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Atomically write `state` to `path`.
pub fn save_project_state(path: &Path, state: &ProjectState) -> Result<(), StateError> {
    let data = serde_yaml::to_string(state).map_err(|source| StateError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    atomic_write(path, data.as_bytes())
}

/// Read tasks.yaml at `path`.
///
/// Every loaded task gets `user_defined = true`, establishing the
/// user-defined vs synthetic distinction for in-memory values.
pub fn load_tasks(path: &Path) -> Result<Tasks, StateError> {
    let data = read_file(path)?;
    let mut tasks: Tasks = serde_yaml::from_str(&data).map_err(|source| StateError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    for task in &mut tasks.epic.tasks {
        task.user_defined = true;
    }
    Ok(tasks)
}

/// Atomically write `tasks` to `path`.
pub fn save_tasks(path: &Path, tasks: &Tasks) -> Result<(), StateError> {
    let data = serde_yaml::to_string(tasks).map_err(|source| StateError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    atomic_write(path, data.as_bytes())
}

fn read_file(path: &Path) -> Result<String, StateError> {
    match fs::read_to_string(path) {
        Ok(data) => Ok(data),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Err(StateError::NotFound {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(StateError::Io {
            context: format!("read {}", path.display()),
            source,
        }),
    }
}

/// Write `data` to `path` via a `.tmp` sibling and rename. On rename failure
/// the temp file is removed best-effort before the error is returned.
fn atomic_write(path: &Path, data: &[u8]) -> Result<(), StateError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, data).map_err(|source| StateError::Io {
        context: format!("write temp file {}", tmp.display()),
        source,
    })?;

    if let Err(source) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(StateError::Io {
            context: format!("rename {} -> {}", tmp.display(), path.display()),
            source,
        });
    }
    Ok(())
}
