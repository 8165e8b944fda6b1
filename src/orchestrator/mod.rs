//! Core orchestration logic: bootstrapping state from the task list,
//! managing task pointers, validating state consistency, and the startup
//! checks that gate the main loop.

mod bootstrap;
mod context;
mod pointers;
mod startup;
mod validation;

pub use bootstrap::{bootstrap_from_tasks, is_epic_already_complete, needs_kb_synthesis};
pub use context::LoopContext;
pub use pointers::{
    advance_to_next_task, increment_attempts, initialize_task_pointers, update_task_status,
};
pub use startup::{check_dependencies, ensure_project_ready};
pub use validation::{validate_state_sync, validate_structure, ValidationResult};
