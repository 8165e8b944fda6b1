//! Agent session result types.

/// The result reported by the agent at the end of a task attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Bug,
    Failure,
    EpicComplete,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "SUCCESS",
            Outcome::Bug => "BUG",
            Outcome::Failure => "FAILURE",
            Outcome::EpicComplete => "EPIC_COMPLETE",
        }
    }

    /// Parse one of the four outcome literals; anything else is `None`.
    pub fn from_marker(raw: &str) -> Option<Self> {
        match raw {
            "SUCCESS" => Some(Outcome::Success),
            "BUG" => Some(Outcome::Bug),
            "FAILURE" => Some(Outcome::Failure),
            "EPIC_COMPLETE" => Some(Outcome::EpicComplete),
            _ => None,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parsed from the YAML front matter of the agent's session file.
///
/// The orchestrator consumes exactly these three fields; any other session
/// metadata in the front matter is ignored for forward compatibility.
#[derive(Debug, Clone)]
pub struct SessionResult {
    pub outcome: Outcome,
    pub changelog_entry: String,
    pub dependencies_added: Vec<String>,
}

impl SessionResult {
    /// The synthetic result used when the session file cannot be parsed:
    /// the loop's retry policy then applies naturally.
    pub fn failure() -> Self {
        SessionResult {
            outcome: Outcome::Failure,
            changelog_entry: String::new(),
            dependencies_added: Vec::new(),
        }
    }
}
