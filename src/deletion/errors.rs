use thiserror::Error;

use crate::records::EntityId;

use super::types::WorkflowStep;

/// Operator actions the workflow refuses in its current state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("No deletion workflow is open")]
    NotOpen,
    #[error("Entity id must not be empty")]
    EmptyEntityId,
    #[error("Impact counts have not loaded yet")]
    CountsNotLoaded,
    #[error("Choose whether to transfer or delete dependent records")]
    DispositionRequired,
    #[error("Choose an entity to receive the transferred records")]
    TargetRequired,
    #[error("{0} is not an eligible transfer target")]
    UnknownTarget(EntityId),
    #[error("Action is only available on step {expected:?}, workflow is on {actual:?}")]
    WrongStep {
        expected: WorkflowStep,
        actual: WorkflowStep,
    },
    #[error("Already on the first step")]
    AtFirstStep,
    #[error("Already on the last step")]
    AtLastStep,
    #[error("A deletion request is in flight")]
    InFlight,
    #[error("Nothing to retry")]
    NothingToRetry,
}
