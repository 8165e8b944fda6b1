//! Task-list document types: the epic definition and its ordered tasks.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use super::state::TaskPointer;

/// The lifecycle state of a user-defined task.
///
/// The `Unknown` variant preserves values outside the closed set so a corrupt
/// tasks.yaml still loads; `validate_structure` rejects it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Todo,
    InProgress,
    Done,
    Blocked,
    Unknown(String),
}

impl Status {
    /// Get the status marker string used in tasks.yaml.
    pub fn as_str(&self) -> &str {
        match self {
            Status::Todo => "TODO",
            Status::InProgress => "IN_PROGRESS",
            Status::Done => "DONE",
            Status::Blocked => "BLOCKED",
            Status::Unknown(raw) => raw,
        }
    }

    /// True when the value is one of the four recognized statuses.
    pub fn is_valid(&self) -> bool {
        !matches!(self, Status::Unknown(_))
    }

    /// True for statuses that still need agent work (TODO or IN_PROGRESS).
    pub fn is_open(&self) -> bool {
        matches!(self, Status::Todo | Status::InProgress)
    }

    fn from_marker(raw: &str) -> Self {
        match raw {
            "TODO" => Status::Todo,
            "IN_PROGRESS" => Status::InProgress,
            "DONE" => Status::Done,
            "BLOCKED" => Status::Blocked,
            other => Status::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Status::from_marker(&raw))
    }
}

/// Classifies a task as user-defined or orchestrator-injected (synthetic).
///
/// Synthetic tasks (bugfix, documentation) are never written to tasks.yaml;
/// they exist only in project-state.yaml as transient pointers. `Other`
/// preserves unrecognized values (including the empty string found in
/// zero-valued state files) for `validate_structure` to reject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskType {
    Feature,
    Bugfix,
    Documentation,
    ManualReview,
    Other(String),
}

impl TaskType {
    pub fn as_str(&self) -> &str {
        match self {
            TaskType::Feature => "feature",
            TaskType::Bugfix => "bugfix",
            TaskType::Documentation => "documentation",
            TaskType::ManualReview => "manual_review",
            TaskType::Other(raw) => raw,
        }
    }

    /// Reports whether this task type is orchestrator-injected. Synthetic
    /// tasks must never be resolved against the task list.
    pub fn is_synthetic(&self) -> bool {
        matches!(self, TaskType::Bugfix | TaskType::Documentation)
    }

    /// True when the field was empty in the source document.
    pub fn is_empty(&self) -> bool {
        matches!(self, TaskType::Other(raw) if raw.is_empty())
    }

    fn from_marker(raw: &str) -> Self {
        match raw {
            "feature" => TaskType::Feature,
            "bugfix" => TaskType::Bugfix,
            "documentation" => TaskType::Documentation,
            "manual_review" => TaskType::ManualReview,
            other => TaskType::Other(other.to_string()),
        }
    }
}

impl Default for TaskType {
    fn default() -> Self {
        TaskType::Other(String::new())
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for TaskType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(TaskType::from_marker(&raw))
    }
}

/// A single entry in the epic task list (tasks.yaml).
///
/// `user_defined` is never serialized. The loader sets it to true for every
/// task read from tasks.yaml; synthetic tasks never appear as `Task` values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    pub id: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub status: Status,
    pub description: String,
    pub acceptance_criteria: Vec<String>,
    #[serde(skip)]
    pub user_defined: bool,
}

impl Default for Task {
    fn default() -> Self {
        Task {
            id: String::new(),
            task_type: TaskType::default(),
            status: Status::Todo,
            description: String::new(),
            acceptance_criteria: Vec::new(),
            user_defined: false,
        }
    }
}

/// The epic block in tasks.yaml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EpicDefinition {
    pub id: String,
    pub name: String,
    pub tasks: Vec<Task>,
}

/// The full structure of tasks.yaml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tasks {
    pub epic: EpicDefinition,
}

impl Tasks {
    /// Look up a user-defined task by id.
    pub fn find(&self, id: &str) -> Option<&Task> {
        self.epic.tasks.iter().find(|t| t.id == id)
    }

    /// Resolve a task pointer against the list. Synthetic pointers return
    /// `None` without scanning: bug and KB ids do not live in tasks.yaml.
    pub fn find_pointer(&self, pointer: &TaskPointer) -> Option<&Task> {
        match pointer.identity() {
            super::state::TaskIdentity::User(id) => self.find(id),
            super::state::TaskIdentity::Bug(_) | super::state::TaskIdentity::KbSynthesis => None,
        }
    }
}
