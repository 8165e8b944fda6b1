//! Session result parsing: extract and validate the YAML front matter the
//! agent wrote at the end of a task attempt.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::{Outcome, SessionResult};

/// Typed failure modes for session result parsing. The caller downgrades
/// all of them to a synthetic FAILURE outcome.
#[derive(Debug, thiserror::Error)]
pub enum SessionParseError {
    #[error("session file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("read session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no YAML frontmatter found")]
    NoFrontmatter,

    #[error("unmarshal frontmatter: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("outcome field is missing or empty")]
    MissingOutcome,

    #[error("invalid outcome {value:?}: must be one of SUCCESS, BUG, FAILURE, EPIC_COMPLETE")]
    InvalidOutcome { value: String },
}

/// Front-matter shape as written by the agent. Unknown keys are ignored for
/// forward compatibility; outcome stays a raw string until validated.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSessionResult {
    outcome: String,
    changelog_entry: String,
    dependencies_added: Vec<String>,
}

/// Read the session file at `path`, extract the first `---`-delimited front
/// matter block (CRLF normalized to LF), and validate it into a
/// `SessionResult`.
pub fn parse_session_result(path: &Path) -> Result<SessionResult, SessionParseError> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(SessionParseError::FileNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(SessionParseError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let frontmatter = extract_frontmatter(&data).ok_or(SessionParseError::NoFrontmatter)?;
    let raw: RawSessionResult = serde_yaml::from_str(&frontmatter)?;

    if raw.outcome.is_empty() {
        return Err(SessionParseError::MissingOutcome);
    }
    let outcome = Outcome::from_marker(&raw.outcome).ok_or(SessionParseError::InvalidOutcome {
        value: raw.outcome.clone(),
    })?;

    Ok(SessionResult {
        outcome,
        changelog_entry: raw.changelog_entry,
        dependencies_added: raw.dependencies_added,
    })
}

/// The lines between the first and second `---` delimiter lines, or `None`
/// when either delimiter is missing.
fn extract_frontmatter(content: &str) -> Option<String> {
    let content = content.replace("\r\n", "\n");
    let lines: Vec<&str> = content.split('\n').collect();

    let start = lines.iter().position(|line| line.trim() == "---")?;
    let end = lines[start + 1..]
        .iter()
        .position(|line| line.trim() == "---")?
        + start
        + 1;

    Some(lines[start + 1..end].join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_session(content: &str) -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("session.md");
        std::fs::write(&path, content).unwrap();
        (tmp, path)
    }

    #[test]
    fn parses_a_complete_result() {
        let (_tmp, path) = write_session(
            "---\noutcome: SUCCESS\nchangelog_entry: \"Add login flow\"\ndependencies_added:\n  - jsonwebtoken\n---\n\n## Summary\n\nDone.\n",
        );
        let result = parse_session_result(&path).unwrap();
        assert_eq!(result.outcome, Outcome::Success);
        assert_eq!(result.changelog_entry, "Add login flow");
        assert_eq!(result.dependencies_added, vec!["jsonwebtoken"]);
    }

    #[test]
    fn crlf_line_endings_are_handled() {
        let (_tmp, path) = write_session("---\r\noutcome: BUG\r\n---\r\nbody\r\n");
        let result = parse_session_result(&path).unwrap();
        assert_eq!(result.outcome, Outcome::Bug);
    }

    #[test]
    fn unknown_frontmatter_keys_are_ignored() {
        let (_tmp, path) = write_session(
            "---\noutcome: SUCCESS\ntask_id: \"X-1\"\ntests_run: 14\n---\n",
        );
        let result = parse_session_result(&path).unwrap();
        assert_eq!(result.outcome, Outcome::Success);
    }

    #[test]
    fn missing_file_is_a_distinct_kind() {
        let tmp = TempDir::new().unwrap();
        let err = parse_session_result(&tmp.path().join("absent.md")).unwrap_err();
        assert!(matches!(err, SessionParseError::FileNotFound { .. }));
    }

    #[test]
    fn missing_delimiters_are_no_frontmatter() {
        let (_tmp, path) = write_session("just a markdown body\n");
        assert!(matches!(
            parse_session_result(&path).unwrap_err(),
            SessionParseError::NoFrontmatter
        ));

        let (_tmp2, path2) = write_session("---\noutcome: SUCCESS\nno closing delimiter\n");
        assert!(matches!(
            parse_session_result(&path2).unwrap_err(),
            SessionParseError::NoFrontmatter
        ));
    }

    #[test]
    fn empty_outcome_is_missing_invalid_literal_is_invalid() {
        let (_tmp, path) = write_session("---\noutcome: \"\"\n---\n");
        assert!(matches!(
            parse_session_result(&path).unwrap_err(),
            SessionParseError::MissingOutcome
        ));

        let (_tmp2, path2) = write_session("---\noutcome: DONE\n---\n");
        match parse_session_result(&path2).unwrap_err() {
            SessionParseError::InvalidOutcome { value } => assert_eq!(value, "DONE"),
            other => panic!("expected InvalidOutcome, got {other:?}"),
        }
    }

    #[test]
    fn pristine_template_parses_as_missing_outcome() {
        // The pre-created session file has an empty outcome; an agent that
        // wrote nothing must surface as MissingOutcome so the loop retries.
        let (_tmp, path) = write_session(crate::templates::SESSION_RESULT);
        assert!(matches!(
            parse_session_result(&path).unwrap_err(),
            SessionParseError::MissingOutcome
        ));
    }
}
