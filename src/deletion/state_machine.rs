use serde::{Deserialize, Serialize};
use statig::prelude::*;

use super::notice::OperatorNotice;
use super::types::DispositionRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutorEvent {
    /// Operator confirmed on the final step
    Confirm { request: DispositionRequest },
    PreflightPassed,
    PreflightRejected { issues: Vec<String> },
    RemoteSucceeded,
    RemoteFailed { notice: OperatorNotice },
    /// Operator asked to replay the failed request
    Retry,
    /// Operator dismissed the failure notice
    Dismiss,
}

/// Observable position of the executor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutorPhase {
    Idle,
    Validating,
    Executing,
    Succeeded,
    Failed,
}

impl ExecutorPhase {
    /// A remote call is outstanding; new confirmations are ignored
    pub fn is_in_flight(&self) -> bool {
        matches!(self, ExecutorPhase::Validating | ExecutorPhase::Executing)
    }
}

#[derive(Debug, Default)]
pub struct DeletionExecutor {
    pub request: Option<DispositionRequest>,
    pub notice: Option<OperatorNotice>,
    /// Phase the last failure happened in; decides where a retry re-enters
    pub failed_in: Option<ExecutorPhase>,
    pub attempts: u32,
}

impl DeletionExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    fn begin(&mut self, request: &DispositionRequest) {
        self.request = Some(request.clone());
        self.notice = None;
        self.failed_in = None;
        self.attempts = 1;
        tracing::info!(
            entity_id = %request.entity_id,
            disposition = %request.disposition,
            target_id = ?request.target_id,
            "Deletion confirmed, running pre-flight"
        );
    }

    fn fail(&mut self, phase: ExecutorPhase, notice: OperatorNotice) {
        tracing::warn!(
            entity_id = ?self.request.as_ref().map(|r| r.entity_id.to_string()),
            phase = ?phase,
            category = %notice.category,
            detail = %notice.detail,
            "Deletion failed"
        );
        self.failed_in = Some(phase);
        self.notice = Some(notice);
    }
}

#[state_machine(initial = "State::idle()")]
impl DeletionExecutor {
    #[state]
    fn idle(&mut self, event: &ExecutorEvent) -> Outcome<State> {
        match event {
            ExecutorEvent::Confirm { request } => {
                self.begin(request);
                Transition(State::validating())
            }
            _ => Handled,
        }
    }

    #[state]
    fn validating(&mut self, event: &ExecutorEvent) -> Outcome<State> {
        match event {
            ExecutorEvent::PreflightPassed => {
                tracing::info!(
                    entity_id = ?self.request.as_ref().map(|r| r.entity_id.to_string()),
                    "Pre-flight passed, issuing disposition request"
                );
                Transition(State::executing())
            }
            ExecutorEvent::PreflightRejected { issues } => {
                self.fail(ExecutorPhase::Validating, OperatorNotice::preflight_rejected(issues));
                Transition(State::failed())
            }
            ExecutorEvent::RemoteFailed { notice } => {
                self.fail(ExecutorPhase::Validating, notice.clone());
                Transition(State::failed())
            }
            // in flight: confirmations and retries are no-ops
            _ => Handled,
        }
    }

    #[state]
    fn executing(&mut self, event: &ExecutorEvent) -> Outcome<State> {
        match event {
            ExecutorEvent::RemoteSucceeded => {
                self.notice = None;
                tracing::info!(
                    entity_id = ?self.request.as_ref().map(|r| r.entity_id.to_string()),
                    attempts = self.attempts,
                    "Disposition succeeded"
                );
                Transition(State::succeeded())
            }
            ExecutorEvent::RemoteFailed { notice } => {
                self.fail(ExecutorPhase::Executing, notice.clone());
                Transition(State::failed())
            }
            _ => Handled,
        }
    }

    #[state]
    fn failed(&mut self, event: &ExecutorEvent) -> Outcome<State> {
        match event {
            ExecutorEvent::Retry => {
                self.attempts += 1;
                self.notice = None;
                let resume = self.failed_in.take();
                tracing::info!(
                    attempts = self.attempts,
                    resume = ?resume,
                    "Operator retried deletion"
                );
                match resume {
                    // a rejected pre-flight must pass again before anything is sent
                    Some(ExecutorPhase::Validating) => Transition(State::validating()),
                    _ => Transition(State::executing()),
                }
            }
            ExecutorEvent::Confirm { request } => {
                self.begin(request);
                Transition(State::validating())
            }
            ExecutorEvent::Dismiss => {
                self.notice = None;
                self.failed_in = None;
                Transition(State::idle())
            }
            _ => Handled,
        }
    }

    #[state]
    fn succeeded(&mut self, event: &ExecutorEvent) -> Outcome<State> {
        match event {
            _ => Handled,
        }
    }
}

/// Map the generated state onto the public phase
pub fn phase_of(state: &State) -> ExecutorPhase {
    match state {
        State::Idle { .. } => ExecutorPhase::Idle,
        State::Validating { .. } => ExecutorPhase::Validating,
        State::Executing { .. } => ExecutorPhase::Executing,
        State::Succeeded { .. } => ExecutorPhase::Succeeded,
        State::Failed { .. } => ExecutorPhase::Failed,
    }
}

/// Executor wrapped with its generated state machine
pub type ExecutorMachine = StateMachine<DeletionExecutor>;

pub fn new_executor() -> ExecutorMachine {
    DeletionExecutor::new().state_machine()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deletion::notice::{ErrorCategory, RetryAction};
    use crate::records::EntityId;
    use crate::store::StoreError;

    fn request() -> DispositionRequest {
        DispositionRequest::transfer(EntityId::from("e-1"), EntityId::from("e-2"))
    }

    fn connectivity() -> OperatorNotice {
        OperatorNotice::from_store_error(
            &StoreError::Connectivity("reset".into()),
            RetryAction::RetryDisposition,
        )
    }

    #[test]
    fn test_happy_path_reaches_succeeded() {
        let mut sm = new_executor();
        assert_eq!(phase_of(sm.state()), ExecutorPhase::Idle);

        sm.handle(&ExecutorEvent::Confirm { request: request() });
        assert_eq!(phase_of(sm.state()), ExecutorPhase::Validating);

        sm.handle(&ExecutorEvent::PreflightPassed);
        assert_eq!(phase_of(sm.state()), ExecutorPhase::Executing);

        sm.handle(&ExecutorEvent::RemoteSucceeded);
        assert_eq!(phase_of(sm.state()), ExecutorPhase::Succeeded);
        assert_eq!(sm.inner().attempts, 1);
    }

    #[test]
    fn test_confirm_while_in_flight_is_ignored() {
        let mut sm = new_executor();
        sm.handle(&ExecutorEvent::Confirm { request: request() });
        sm.handle(&ExecutorEvent::PreflightPassed);

        let other = DispositionRequest::delete(EntityId::from("e-9"));
        sm.handle(&ExecutorEvent::Confirm { request: other });
        sm.handle(&ExecutorEvent::Retry);

        assert_eq!(phase_of(sm.state()), ExecutorPhase::Executing);
        assert_eq!(sm.inner().request, Some(request()));
    }

    #[test]
    fn test_execution_failure_retry_replays_same_request() {
        let mut sm = new_executor();
        sm.handle(&ExecutorEvent::Confirm { request: request() });
        sm.handle(&ExecutorEvent::PreflightPassed);
        sm.handle(&ExecutorEvent::RemoteFailed { notice: connectivity() });

        assert_eq!(phase_of(sm.state()), ExecutorPhase::Failed);
        assert_eq!(
            sm.inner().notice.as_ref().map(|n| n.category),
            Some(ErrorCategory::Connectivity)
        );

        sm.handle(&ExecutorEvent::Retry);
        assert_eq!(phase_of(sm.state()), ExecutorPhase::Executing);
        assert_eq!(sm.inner().request, Some(request()));
        assert_eq!(sm.inner().attempts, 2);
        assert!(sm.inner().notice.is_none());
    }

    #[test]
    fn test_rejected_preflight_retries_through_validation() {
        let mut sm = new_executor();
        sm.handle(&ExecutorEvent::Confirm { request: request() });
        sm.handle(&ExecutorEvent::PreflightRejected {
            issues: vec!["open payroll run".to_string()],
        });

        assert_eq!(phase_of(sm.state()), ExecutorPhase::Failed);
        assert_eq!(
            sm.inner().notice.as_ref().map(|n| n.category),
            Some(ErrorCategory::DataIntegrity)
        );

        sm.handle(&ExecutorEvent::Retry);
        assert_eq!(phase_of(sm.state()), ExecutorPhase::Validating);
    }

    #[test]
    fn test_dismiss_returns_to_idle() {
        let mut sm = new_executor();
        sm.handle(&ExecutorEvent::Confirm { request: request() });
        sm.handle(&ExecutorEvent::RemoteFailed { notice: connectivity() });
        sm.handle(&ExecutorEvent::Dismiss);

        assert_eq!(phase_of(sm.state()), ExecutorPhase::Idle);
        assert!(sm.inner().notice.is_none());
    }

    #[test]
    fn test_succeeded_is_terminal() {
        let mut sm = new_executor();
        sm.handle(&ExecutorEvent::Confirm { request: request() });
        sm.handle(&ExecutorEvent::PreflightPassed);
        sm.handle(&ExecutorEvent::RemoteSucceeded);
        sm.handle(&ExecutorEvent::Retry);
        sm.handle(&ExecutorEvent::Confirm { request: request() });

        assert_eq!(phase_of(sm.state()), ExecutorPhase::Succeeded);
    }
}
