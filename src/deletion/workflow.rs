// Cascade-deletion workflow: wizard steps plus the guarded executor
//
// The session lives behind a tokio mutex that is only held for short,
// synchronous sections. Store calls happen with the lock released, so a second
// confirmation arriving mid-flight observes the in-flight phase and does
// nothing.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn, Instrument};

use crate::auth::AuthContext;
use crate::records::{Entity, EntityId};
use crate::store::DataStore;
use crate::telemetry::{create_workflow_span, generate_correlation_id};

use super::candidates::{self, CandidateView};
use super::errors::WorkflowError;
use super::impact;
use super::notice::{OperatorNotice, RetryAction};
use super::state_machine::{new_executor, phase_of, ExecutorEvent, ExecutorMachine, ExecutorPhase};
use super::types::{
    DependentRecordCounts, DispositionChoice, DispositionRequest, LoadState, TransferTarget,
    WorkflowStep,
};
use super::wizard::WizardState;

/// Callbacks into the view hosting the workflow
pub trait WorkflowHost: Send + Sync {
    /// Fired once after the disposition request succeeds
    fn on_success(&self, entity_id: &EntityId);

    /// Fired whenever the workflow is dismissed, completed or cancelled
    fn on_close(&self);
}

/// Result of a confirmation or retry
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Succeeded,
    Failed(OperatorNotice),
    /// A request was already outstanding; nothing was sent
    AlreadyInFlight,
}

/// Everything a view needs to render the workflow
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowView {
    pub entity: Entity,
    pub step: WorkflowStep,
    pub counts: LoadState<DependentRecordCounts>,
    pub disposition: Option<DispositionChoice>,
    pub candidates: CandidateView,
    pub filter: String,
    pub target: Option<TransferTarget>,
    pub can_advance: bool,
    pub phase: ExecutorPhase,
    pub notice: Option<OperatorNotice>,
}

struct Session {
    correlation_id: String,
    wizard: WizardState,
    executor: ExecutorMachine,
}

impl Session {
    fn phase(&self) -> ExecutorPhase {
        phase_of(self.executor.state())
    }

    fn ensure_idle(&self) -> Result<(), WorkflowError> {
        if self.phase().is_in_flight() {
            Err(WorkflowError::InFlight)
        } else {
            Ok(())
        }
    }

    fn view(&self) -> WorkflowView {
        let wizard = &self.wizard;
        WorkflowView {
            entity: wizard.entity.clone(),
            step: wizard.step,
            counts: wizard.counts.clone(),
            disposition: wizard.disposition,
            candidates: candidates::candidate_view(&wizard.candidates, &wizard.filter),
            filter: wizard.filter.clone(),
            target: wizard.target.clone(),
            can_advance: wizard.can_advance() && !self.phase().is_in_flight(),
            phase: self.phase(),
            notice: self.executor.inner().notice.clone(),
        }
    }
}

pub struct CascadeDeletionWorkflow<S: DataStore + ?Sized = dyn DataStore> {
    store: Arc<S>,
    auth: AuthContext,
    host: Arc<dyn WorkflowHost>,
    session: Mutex<Option<Session>>,
}

impl<S: DataStore + ?Sized> CascadeDeletionWorkflow<S> {
    pub fn new(store: Arc<S>, auth: AuthContext, host: Arc<dyn WorkflowHost>) -> Self {
        Self {
            store,
            auth,
            host,
            session: Mutex::new(None),
        }
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Snapshot for rendering; `None` while closed
    pub async fn view(&self) -> Option<WorkflowView> {
        self.session.lock().await.as_ref().map(Session::view)
    }

    /// Begin at step 1 for `entity` and load its impact counts
    pub async fn open(&self, entity: Entity) -> Result<(), WorkflowError> {
        if entity.id.is_empty() {
            return Err(WorkflowError::EmptyEntityId);
        }

        let correlation_id = generate_correlation_id();
        {
            let mut guard = self.session.lock().await;
            if let Some(existing) = guard.as_ref() {
                existing.ensure_idle()?;
            }
            info!(
                entity_id = %entity.id,
                correlation_id = %correlation_id,
                "Opening deletion workflow"
            );
            *guard = Some(Session {
                correlation_id: correlation_id.clone(),
                wizard: WizardState::new(entity),
                executor: new_executor(),
            });
        }

        self.load_counts().await
    }

    /// Re-run a failed impact query; stays on step 1
    pub async fn retry_impact(&self) -> Result<(), WorkflowError> {
        {
            let guard = self.session.lock().await;
            let session = guard.as_ref().ok_or(WorkflowError::NotOpen)?;
            if session.wizard.step != WorkflowStep::ImpactPreview {
                return Err(WorkflowError::WrongStep {
                    expected: WorkflowStep::ImpactPreview,
                    actual: session.wizard.step,
                });
            }
        }
        self.load_counts().await
    }

    async fn load_counts(&self) -> Result<(), WorkflowError> {
        let (entity_id, correlation_id) = {
            let mut guard = self.session.lock().await;
            let session = guard.as_mut().ok_or(WorkflowError::NotOpen)?;
            session.wizard.counts = LoadState::Loading;
            (session.wizard.entity_id().clone(), session.correlation_id.clone())
        };

        let span = create_workflow_span(
            "analyze_impact",
            Some(entity_id.as_str()),
            Some(correlation_id.as_str()),
        );
        let result = impact::analyze_impact(&*self.store, &self.auth, &entity_id)
            .instrument(span)
            .await;

        let mut guard = self.session.lock().await;
        let Some(session) = guard.as_mut().filter(|s| s.correlation_id == correlation_id) else {
            warn!(%entity_id, "Workflow changed while counts were loading; discarding result");
            return Ok(());
        };
        session.wizard.counts = match result {
            Ok(counts) => LoadState::Loaded(counts),
            Err(e) => LoadState::Failed(OperatorNotice::from_store_error(&e, RetryAction::RetryFetch)),
        };
        Ok(())
    }

    pub async fn select_disposition(&self, choice: DispositionChoice) -> Result<(), WorkflowError> {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or(WorkflowError::NotOpen)?;
        session.wizard.select_disposition(choice)
    }

    /// Advance one step, skipping steps the current selections make moot
    pub async fn next(&self) -> Result<WorkflowStep, WorkflowError> {
        let needs_candidates = {
            let mut guard = self.session.lock().await;
            let session = guard.as_mut().ok_or(WorkflowError::NotOpen)?;
            session.ensure_idle()?;

            let destination = session.wizard.next_step()?;
            info!(
                entity_id = %session.wizard.entity_id(),
                from = session.wizard.step.number(),
                to = destination.number(),
                "Workflow step advanced"
            );
            session.wizard.step = destination;

            destination == WorkflowStep::TransferTarget
                && !matches!(session.wizard.candidates, LoadState::Loaded(_))
        };

        if needs_candidates {
            self.load_candidates().await?;
        }

        let guard = self.session.lock().await;
        let session = guard.as_ref().ok_or(WorkflowError::NotOpen)?;
        Ok(session.wizard.step)
    }

    pub async fn back(&self) -> Result<WorkflowStep, WorkflowError> {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or(WorkflowError::NotOpen)?;
        session.ensure_idle()?;

        let destination = session.wizard.previous_step()?;
        if session.phase() == ExecutorPhase::Failed {
            session.executor.handle(&ExecutorEvent::Dismiss);
        }
        session.wizard.step = destination;
        Ok(destination)
    }

    /// Re-run a failed candidate fetch; stays on step 3
    pub async fn retry_candidates(&self) -> Result<(), WorkflowError> {
        {
            let guard = self.session.lock().await;
            let session = guard.as_ref().ok_or(WorkflowError::NotOpen)?;
            if session.wizard.step != WorkflowStep::TransferTarget {
                return Err(WorkflowError::WrongStep {
                    expected: WorkflowStep::TransferTarget,
                    actual: session.wizard.step,
                });
            }
        }
        self.load_candidates().await
    }

    async fn load_candidates(&self) -> Result<(), WorkflowError> {
        let (entity_id, correlation_id) = {
            let mut guard = self.session.lock().await;
            let session = guard.as_mut().ok_or(WorkflowError::NotOpen)?;
            session.wizard.candidates = LoadState::Loading;
            (session.wizard.entity_id().clone(), session.correlation_id.clone())
        };

        let span = create_workflow_span(
            "list_transfer_candidates",
            Some(entity_id.as_str()),
            Some(correlation_id.as_str()),
        );
        let result = candidates::fetch_candidates(&*self.store, &self.auth, &entity_id)
            .instrument(span)
            .await;

        let mut guard = self.session.lock().await;
        let Some(session) = guard.as_mut().filter(|s| s.correlation_id == correlation_id) else {
            warn!(%entity_id, "Workflow changed while candidates were loading; discarding result");
            return Ok(());
        };
        session.wizard.candidates = match result {
            Ok(list) => {
                // a previously chosen target must still be eligible
                if let Some(target) = &session.wizard.target {
                    if !list.iter().any(|c| c.id == target.id) {
                        session.wizard.target = None;
                    }
                }
                LoadState::Loaded(list)
            }
            Err(e) => LoadState::Failed(OperatorNotice::from_store_error(&e, RetryAction::RetryFetch)),
        };
        Ok(())
    }

    /// Client-side filter over the loaded candidates
    pub async fn set_filter(&self, filter: &str) -> Result<(), WorkflowError> {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or(WorkflowError::NotOpen)?;
        session.wizard.set_filter(filter);
        Ok(())
    }

    pub async fn select_target(&self, target_id: &EntityId) -> Result<(), WorkflowError> {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or(WorkflowError::NotOpen)?;
        session.wizard.select_target(target_id)
    }

    /// Final confirmation: pre-flight, then the single disposition request
    pub async fn confirm(&self) -> Result<ExecutionOutcome, WorkflowError> {
        let (request, correlation_id) = {
            let mut guard = self.session.lock().await;
            let session = guard.as_mut().ok_or(WorkflowError::NotOpen)?;
            if session.phase().is_in_flight() {
                info!(
                    entity_id = %session.wizard.entity_id(),
                    "Confirmation ignored, request already in flight"
                );
                return Ok(ExecutionOutcome::AlreadyInFlight);
            }
            if session.wizard.step != WorkflowStep::Confirmation {
                return Err(WorkflowError::WrongStep {
                    expected: WorkflowStep::Confirmation,
                    actual: session.wizard.step,
                });
            }

            let request = session.wizard.disposition_request()?;
            session.executor.handle(&ExecutorEvent::Confirm {
                request: request.clone(),
            });
            (request, session.correlation_id.clone())
        };

        self.drive(request, ExecutorPhase::Validating, correlation_id).await
    }

    /// Replay the failed request with identical parameters
    pub async fn retry(&self) -> Result<ExecutionOutcome, WorkflowError> {
        let (request, resume, correlation_id) = {
            let mut guard = self.session.lock().await;
            let session = guard.as_mut().ok_or(WorkflowError::NotOpen)?;
            match session.phase() {
                ExecutorPhase::Failed => {}
                phase if phase.is_in_flight() => return Ok(ExecutionOutcome::AlreadyInFlight),
                _ => return Err(WorkflowError::NothingToRetry),
            }

            session.executor.handle(&ExecutorEvent::Retry);
            let request = session
                .executor
                .inner()
                .request
                .clone()
                .ok_or(WorkflowError::NothingToRetry)?;
            (request, session.phase(), session.correlation_id.clone())
        };

        self.drive(request, resume, correlation_id).await
    }

    async fn drive(
        &self,
        request: DispositionRequest,
        start: ExecutorPhase,
        correlation_id: String,
    ) -> Result<ExecutionOutcome, WorkflowError> {
        let span = create_workflow_span(
            "execute_disposition",
            Some(request.entity_id.as_str()),
            Some(correlation_id.as_str()),
        );
        self.drive_inner(request, start).instrument(span).await
    }

    async fn drive_inner(
        &self,
        request: DispositionRequest,
        start: ExecutorPhase,
    ) -> Result<ExecutionOutcome, WorkflowError> {
        if start == ExecutorPhase::Validating {
            let preflight = self.store.validate_deletable(&self.auth, &request.entity_id).await;
            let event = match preflight {
                Ok(report) if report.can_proceed => ExecutorEvent::PreflightPassed,
                Ok(report) => ExecutorEvent::PreflightRejected {
                    issues: report.issues,
                },
                Err(e) => ExecutorEvent::RemoteFailed {
                    notice: OperatorNotice::from_store_error(&e, RetryAction::RetryDisposition),
                },
            };
            if let Some(outcome) = self.apply(event).await? {
                return Ok(outcome);
            }
        }

        let result = self.store.execute_disposition(&self.auth, &request).await;
        let event = match result {
            Ok(()) => ExecutorEvent::RemoteSucceeded,
            Err(e) => ExecutorEvent::RemoteFailed {
                notice: OperatorNotice::from_store_error(&e, RetryAction::RetryDisposition),
            },
        };
        if let Some(outcome) = self.apply(event).await? {
            return Ok(outcome);
        }

        // executor is in `succeeded`: report to the host, then close
        let entity_id = request.entity_id;
        {
            let mut guard = self.session.lock().await;
            guard.take();
        }
        info!(%entity_id, "Deletion workflow completed");
        self.host.on_success(&entity_id);
        self.host.on_close();
        Ok(ExecutionOutcome::Succeeded)
    }

    /// Feed an event in; returns an outcome when the run stops here
    async fn apply(&self, event: ExecutorEvent) -> Result<Option<ExecutionOutcome>, WorkflowError> {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or(WorkflowError::NotOpen)?;
        session.executor.handle(&event);

        match session.phase() {
            ExecutorPhase::Failed => {
                let notice = session
                    .executor
                    .inner()
                    .notice
                    .clone()
                    .unwrap_or_else(|| OperatorNotice::invalid_input("failure without a notice"));
                Ok(Some(ExecutionOutcome::Failed(notice)))
            }
            _ => Ok(None),
        }
    }

    /// Clear a failure notice without retrying
    pub async fn dismiss_notice(&self) -> Result<(), WorkflowError> {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or(WorkflowError::NotOpen)?;
        if session.phase() == ExecutorPhase::Failed {
            session.executor.handle(&ExecutorEvent::Dismiss);
        }
        Ok(())
    }

    /// Dismiss the workflow. Refused while a request is in flight.
    pub async fn close(&self) -> Result<(), WorkflowError> {
        {
            let mut guard = self.session.lock().await;
            let session = guard.as_ref().ok_or(WorkflowError::NotOpen)?;
            session.ensure_idle()?;
            info!(entity_id = %session.wizard.entity_id(), "Deletion workflow closed");
            guard.take();
        }
        self.host.on_close();
        Ok(())
    }
}
