// Step navigation for the deletion wizard
//
// Pure state: no store calls happen here. The workflow drives loading and
// feeds results back in.

use crate::records::{Entity, EntityId};

use super::errors::WorkflowError;
use super::types::{
    DependentRecordCounts, DispositionChoice, DispositionRequest, LoadState, TransferTarget,
    WorkflowStep,
};

#[derive(Debug, Clone)]
pub struct WizardState {
    pub entity: Entity,
    pub step: WorkflowStep,
    pub counts: LoadState<DependentRecordCounts>,
    pub disposition: Option<DispositionChoice>,
    pub candidates: LoadState<Vec<TransferTarget>>,
    pub filter: String,
    pub target: Option<TransferTarget>,
}

impl WizardState {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            step: WorkflowStep::ImpactPreview,
            counts: LoadState::NotRequested,
            disposition: None,
            candidates: LoadState::NotRequested,
            filter: String::new(),
            target: None,
        }
    }

    pub fn entity_id(&self) -> &EntityId {
        &self.entity.id
    }

    fn expect_step(&self, expected: WorkflowStep) -> Result<(), WorkflowError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WorkflowError::WrongStep {
                expected,
                actual: self.step,
            })
        }
    }

    /// Whether "next" is enabled on the current step
    pub fn can_advance(&self) -> bool {
        self.next_step().is_ok()
    }

    /// Destination of "next", or why it is disabled
    pub fn next_step(&self) -> Result<WorkflowStep, WorkflowError> {
        match self.step {
            WorkflowStep::ImpactPreview => {
                let counts = self.counts.loaded().ok_or(WorkflowError::CountsNotLoaded)?;
                if counts.has_dependents() {
                    Ok(WorkflowStep::DispositionChoice)
                } else {
                    Ok(WorkflowStep::Confirmation)
                }
            }
            WorkflowStep::DispositionChoice => match self.disposition {
                Some(DispositionChoice::Transfer) => Ok(WorkflowStep::TransferTarget),
                Some(DispositionChoice::Delete) => Ok(WorkflowStep::Confirmation),
                None => Err(WorkflowError::DispositionRequired),
            },
            WorkflowStep::TransferTarget => {
                if self.target.is_some() {
                    Ok(WorkflowStep::Confirmation)
                } else {
                    Err(WorkflowError::TargetRequired)
                }
            }
            WorkflowStep::Confirmation => Err(WorkflowError::AtLastStep),
        }
    }

    /// Destination of "back", mirroring the skips taken going forward
    pub fn previous_step(&self) -> Result<WorkflowStep, WorkflowError> {
        match self.step {
            WorkflowStep::ImpactPreview => Err(WorkflowError::AtFirstStep),
            WorkflowStep::DispositionChoice => Ok(WorkflowStep::ImpactPreview),
            WorkflowStep::TransferTarget => Ok(WorkflowStep::DispositionChoice),
            WorkflowStep::Confirmation => {
                let has_dependents = self
                    .counts
                    .loaded()
                    .map(DependentRecordCounts::has_dependents)
                    .unwrap_or(false);
                if !has_dependents {
                    Ok(WorkflowStep::ImpactPreview)
                } else if self.disposition == Some(DispositionChoice::Transfer) {
                    Ok(WorkflowStep::TransferTarget)
                } else {
                    Ok(WorkflowStep::DispositionChoice)
                }
            }
        }
    }

    pub fn select_disposition(&mut self, choice: DispositionChoice) -> Result<(), WorkflowError> {
        self.expect_step(WorkflowStep::DispositionChoice)?;
        self.disposition = Some(choice);
        Ok(())
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    /// Record a target picked from the loaded candidates
    pub fn select_target(&mut self, target_id: &EntityId) -> Result<(), WorkflowError> {
        self.expect_step(WorkflowStep::TransferTarget)?;
        if target_id == self.entity_id() {
            return Err(WorkflowError::UnknownTarget(target_id.clone()));
        }
        let candidate = self
            .candidates
            .loaded()
            .and_then(|candidates| candidates.iter().find(|c| &c.id == target_id))
            .ok_or_else(|| WorkflowError::UnknownTarget(target_id.clone()))?;
        self.target = Some(candidate.clone());
        Ok(())
    }

    /// Request built from the current selections, as sent on confirmation
    pub fn disposition_request(&self) -> Result<DispositionRequest, WorkflowError> {
        let counts = self.counts.loaded().ok_or(WorkflowError::CountsNotLoaded)?;
        let entity_id = self.entity_id().clone();

        if !counts.has_dependents() {
            return Ok(DispositionRequest::delete(entity_id));
        }

        match self.disposition {
            Some(DispositionChoice::Delete) => Ok(DispositionRequest::delete(entity_id)),
            Some(DispositionChoice::Transfer) => {
                let target = self.target.as_ref().ok_or(WorkflowError::TargetRequired)?;
                Ok(DispositionRequest::transfer(entity_id, target.id.clone()))
            }
            None => Err(WorkflowError::DispositionRequired),
        }
    }
}
