// Core types for the cascade-deletion workflow

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::listing::Listable;
use crate::records::{Entity, EntityId};

/// Dependent records that reference an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DependentRecordCounts {
    /// Tasks assigned to the entity
    pub assigned_tasks: u32,
    /// Calendar events owned by the entity
    pub owned_events: u32,
}

impl DependentRecordCounts {
    pub fn new(assigned_tasks: u32, owned_events: u32) -> Self {
        Self {
            assigned_tasks,
            owned_events,
        }
    }

    /// Sum of the named counts, never stored separately
    pub fn total_impact(&self) -> u32 {
        self.assigned_tasks.saturating_add(self.owned_events)
    }

    pub fn has_dependents(&self) -> bool {
        self.total_impact() > 0
    }
}

/// How dependent records are handled when their owner is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispositionChoice {
    /// Reassign dependents to another entity
    Transfer,
    /// Delete dependents along with the entity
    Delete,
}

impl fmt::Display for DispositionChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispositionChoice::Transfer => f.write_str("transfer"),
            DispositionChoice::Delete => f.write_str("delete"),
        }
    }
}

/// Candidate that can receive reassigned dependents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferTarget {
    pub id: EntityId,
    pub display_name: String,
    pub category: String,
}

impl From<&Entity> for TransferTarget {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.id.clone(),
            display_name: entity.display_name.clone(),
            category: entity.category.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSortKey {
    DisplayName,
    Category,
}

impl Listable for TransferTarget {
    type SortKey = TargetSortKey;

    fn search_fields(&self) -> Vec<&str> {
        vec![self.display_name.as_str(), self.category.as_str()]
    }

    fn compare_by(&self, other: &Self, key: TargetSortKey) -> Ordering {
        match key {
            TargetSortKey::DisplayName => self.display_name.cmp(&other.display_name),
            TargetSortKey::Category => self
                .category
                .cmp(&other.category)
                .then_with(|| self.display_name.cmp(&other.display_name)),
        }
    }
}

/// Single request that performs the chosen disposition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispositionRequest {
    pub entity_id: EntityId,
    pub disposition: DispositionChoice,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<EntityId>,
}

impl DispositionRequest {
    pub fn delete(entity_id: EntityId) -> Self {
        Self {
            entity_id,
            disposition: DispositionChoice::Delete,
            target_id: None,
        }
    }

    pub fn transfer(entity_id: EntityId, target_id: EntityId) -> Self {
        Self {
            entity_id,
            disposition: DispositionChoice::Transfer,
            target_id: Some(target_id),
        }
    }
}

/// Result of the pre-flight deletability check
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeletabilityReport {
    pub can_proceed: bool,
    pub issues: Vec<String>,
}

impl DeletabilityReport {
    pub fn clear() -> Self {
        Self {
            can_proceed: true,
            issues: Vec::new(),
        }
    }

    pub fn blocked(issues: Vec<String>) -> Self {
        Self {
            can_proceed: false,
            issues,
        }
    }
}

/// Position in the deletion wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WorkflowStep {
    ImpactPreview,
    DispositionChoice,
    TransferTarget,
    Confirmation,
}

impl WorkflowStep {
    /// 1-based step number shown to the operator
    pub fn number(&self) -> u8 {
        match self {
            WorkflowStep::ImpactPreview => 1,
            WorkflowStep::DispositionChoice => 2,
            WorkflowStep::TransferTarget => 3,
            WorkflowStep::Confirmation => 4,
        }
    }
}

/// Remote data that loads asynchronously into the wizard
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState<T> {
    #[default]
    NotRequested,
    Loading,
    Loaded(T),
    Failed(crate::deletion::notice::OperatorNotice),
}

impl<T> LoadState<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn error(&self) -> Option<&crate::deletion::notice::OperatorNotice> {
        match self {
            LoadState::Failed(notice) => Some(notice),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_impact_is_derived() {
        let counts = DependentRecordCounts::new(2, 1);
        assert_eq!(counts.total_impact(), 3);
        assert!(counts.has_dependents());
        assert!(!DependentRecordCounts::default().has_dependents());
    }

    #[test]
    fn test_step_numbers() {
        assert_eq!(WorkflowStep::ImpactPreview.number(), 1);
        assert_eq!(WorkflowStep::Confirmation.number(), 4);
        assert!(WorkflowStep::TransferTarget < WorkflowStep::Confirmation);
    }

    #[test]
    fn test_disposition_request_serializes_without_empty_target() {
        let request = DispositionRequest::delete(EntityId::from("e-1"));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({ "entity_id": "e-1", "disposition": "delete" }));
    }
}
