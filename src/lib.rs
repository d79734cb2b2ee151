// Workload Desk Library - cascade deletion and optimistic task completion
// This exposes the core components for the CLI and for integration tests

pub mod auth;
pub mod cli;
pub mod completion;
pub mod config;
pub mod deletion;
pub mod listing;
pub mod records;
pub mod store;
pub mod telemetry;

// Re-export key types for easy access
pub use auth::{AuthContext, Permission};
pub use completion::{CompletionError, Countdown, TaskBoard, TaskSortKey, UndoBuffer};
pub use config::{config, init_config, DeskConfig};
pub use deletion::{
    CascadeDeletionWorkflow, DependentRecordCounts, DispositionChoice, DispositionRequest,
    ExecutionOutcome, OperatorNotice, WorkflowError, WorkflowHost, WorkflowStep, WorkflowView,
};
pub use listing::{ListQuery, Listable, Page, SortDirection};
pub use records::{CalendarEvent, Entity, EntityId, RecordError, Task, TaskId, TaskStatus};
pub use store::{DataStore, InMemoryStore, Snapshot, StoreError};
pub use telemetry::{create_workflow_span, generate_correlation_id, init_telemetry};
