// Cascade-deletion workflow
//
// Impact analysis, transfer-or-delete branching, transfer-target selection and
// a guarded executor that sends at most one disposition request at a time.

pub mod candidates;
pub mod errors;
pub mod impact;
pub mod notice;
pub mod state_machine;
pub mod types;
pub mod wizard;
pub mod workflow;


pub use candidates::CandidateView;
pub use errors::WorkflowError;
pub use notice::{ErrorCategory, OperatorNotice, RetryAction};
pub use state_machine::{DeletionExecutor, ExecutorEvent, ExecutorPhase};
pub use types::{
    DeletabilityReport, DependentRecordCounts, DispositionChoice, DispositionRequest, LoadState,
    TransferTarget, WorkflowStep,
};
pub use workflow::{CascadeDeletionWorkflow, ExecutionOutcome, WorkflowHost, WorkflowView};
