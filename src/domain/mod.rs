//! Shared domain types for the doug orchestrator: the two persisted YAML
//! documents, the closed enumerations, and the agent session result.

mod session;
mod state;
mod task;

pub use session::{Outcome, SessionResult};
pub use state::{
    EpicState, Metrics, ProjectState, TaskIdentity, TaskMetric, TaskPointer, BUG_ID_PREFIX,
    KB_UPDATE_ID,
};
pub use task::{EpicDefinition, Status, Task, TaskType, Tasks};
