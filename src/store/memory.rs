// In-memory reference store backed by a snapshot

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::auth::{AuthContext, Permission};
use crate::deletion::types::{
    DeletabilityReport, DependentRecordCounts, DispositionChoice, DispositionRequest,
    TransferTarget,
};
use crate::records::{EntityId, RecordKind, TaskId, TaskStatus};

use super::errors::StoreError;
use super::snapshot::Snapshot;
use super::traits::DataStore;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: RwLock<Snapshot>,
    latency: Option<Duration>,
}

impl InMemoryStore {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            data: RwLock::new(snapshot),
            latency: None,
        }
    }

    /// Delay every call, simulating a round trip to the hosted store
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Copy of the current contents, e.g. for saving back to disk
    pub async fn snapshot(&self) -> Snapshot {
        self.data.read().await.clone()
    }

    /// Persist a task status once its completion can no longer be undone
    pub async fn record_task_status(
        &self,
        auth: &AuthContext,
        task_id: &TaskId,
        status: TaskStatus,
    ) -> Result<(), StoreError> {
        self.round_trip().await;
        Self::require(auth, Permission::ManageTasks)?;

        let mut data = self.data.write().await;
        let task = data
            .tasks
            .iter_mut()
            .find(|task| &task.id == task_id)
            .ok_or_else(|| StoreError::NotFound {
                kind: RecordKind::Task,
                id: task_id.to_string(),
            })?;
        task.status = status;
        info!(%task_id, status = status.as_str(), "Task status recorded");
        Ok(())
    }

    async fn round_trip(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn require(auth: &AuthContext, permission: Permission) -> Result<(), StoreError> {
        if auth.can(permission) {
            Ok(())
        } else {
            Err(StoreError::PermissionDenied(format!(
                "operator {} lacks {:?}",
                auth.operator_id, permission
            )))
        }
    }

    fn entity_exists(data: &Snapshot, entity_id: &EntityId) -> bool {
        data.entities.iter().any(|entity| &entity.id == entity_id)
    }

    fn not_found(entity_id: &EntityId) -> StoreError {
        StoreError::NotFound {
            kind: RecordKind::Entity,
            id: entity_id.to_string(),
        }
    }
}

#[async_trait]
impl DataStore for InMemoryStore {
    async fn get_dependent_counts(
        &self,
        auth: &AuthContext,
        entity_id: &EntityId,
    ) -> Result<DependentRecordCounts, StoreError> {
        self.round_trip().await;
        Self::require(auth, Permission::ViewWorkload)?;

        let data = self.data.read().await;
        if !Self::entity_exists(&data, entity_id) {
            return Err(Self::not_found(entity_id));
        }

        let assigned_tasks = data
            .tasks
            .iter()
            .filter(|task| task.assignee_id.as_ref() == Some(entity_id))
            .count();
        let owned_events = data
            .events
            .iter()
            .filter(|event| &event.owner_id == entity_id)
            .count();

        Ok(DependentRecordCounts::new(
            u32::try_from(assigned_tasks).unwrap_or(u32::MAX),
            u32::try_from(owned_events).unwrap_or(u32::MAX),
        ))
    }

    async fn list_transfer_candidates(
        &self,
        auth: &AuthContext,
        excluding: &EntityId,
    ) -> Result<Vec<TransferTarget>, StoreError> {
        self.round_trip().await;
        Self::require(auth, Permission::ViewWorkload)?;

        let data = self.data.read().await;
        Ok(data
            .entities
            .iter()
            .filter(|entity| &entity.id != excluding)
            .map(TransferTarget::from)
            .collect())
    }

    async fn validate_deletable(
        &self,
        auth: &AuthContext,
        entity_id: &EntityId,
    ) -> Result<DeletabilityReport, StoreError> {
        self.round_trip().await;
        Self::require(auth, Permission::DeleteEntities)?;

        let data = self.data.read().await;
        let mut issues = Vec::new();
        if !Self::entity_exists(&data, entity_id) {
            issues.push(format!("{entity_id} no longer exists"));
        }
        if auth.is_operator(entity_id) {
            issues.push("operators cannot delete their own record".to_string());
        }

        if issues.is_empty() {
            Ok(DeletabilityReport::clear())
        } else {
            Ok(DeletabilityReport::blocked(issues))
        }
    }

    async fn execute_disposition(
        &self,
        auth: &AuthContext,
        request: &DispositionRequest,
    ) -> Result<(), StoreError> {
        self.round_trip().await;
        Self::require(auth, Permission::DeleteEntities)?;

        let mut data = self.data.write().await;
        let entity_id = &request.entity_id;
        if !Self::entity_exists(&data, entity_id) {
            return Err(Self::not_found(entity_id));
        }

        match request.disposition {
            DispositionChoice::Transfer => {
                let target_id = request.target_id.as_ref().ok_or_else(|| {
                    StoreError::Constraint("transfer requires a target entity".to_string())
                })?;
                if target_id == entity_id {
                    return Err(StoreError::Constraint(
                        "cannot transfer dependents to the entity being deleted".to_string(),
                    ));
                }
                if !Self::entity_exists(&data, target_id) {
                    return Err(StoreError::Constraint(format!(
                        "transfer target {target_id} does not exist"
                    )));
                }

                let mut moved = 0usize;
                for task in data
                    .tasks
                    .iter_mut()
                    .filter(|task| task.assignee_id.as_ref() == Some(entity_id))
                {
                    task.assignee_id = Some(target_id.clone());
                    moved += 1;
                }
                for event in data.events.iter_mut().filter(|event| &event.owner_id == entity_id) {
                    event.owner_id = target_id.clone();
                    moved += 1;
                }
                debug!(%entity_id, %target_id, moved, "Dependents reassigned");
            }
            DispositionChoice::Delete => {
                let before = data.tasks.len() + data.events.len();
                data.tasks
                    .retain(|task| task.assignee_id.as_ref() != Some(entity_id));
                data.events.retain(|event| &event.owner_id != entity_id);
                let removed = before - (data.tasks.len() + data.events.len());
                debug!(%entity_id, removed, "Dependents deleted");
            }
        }

        data.entities.retain(|entity| &entity.id != entity_id);
        info!(
            %entity_id,
            disposition = %request.disposition,
            "Entity removed from store"
        );
        Ok(())
    }
}
