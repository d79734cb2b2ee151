use async_trait::async_trait;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

use crate::auth::AuthContext;
use crate::deletion::types::{
    DeletabilityReport, DependentRecordCounts, DispositionRequest, TransferTarget,
};
use crate::records::EntityId;

use super::errors::StoreError;

/// Remote operations the deletion workflow consumes
///
/// Every call carries the operator's [`AuthContext`]; implementations are
/// expected to enforce their own access rules and report
/// [`StoreError::PermissionDenied`] rather than silently filtering.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Count the records that reference `entity_id`
    async fn get_dependent_counts(
        &self,
        auth: &AuthContext,
        entity_id: &EntityId,
    ) -> Result<DependentRecordCounts, StoreError>;

    /// Entities able to receive reassigned dependents, minus `excluding`
    async fn list_transfer_candidates(
        &self,
        auth: &AuthContext,
        excluding: &EntityId,
    ) -> Result<Vec<TransferTarget>, StoreError>;

    /// Pre-flight check run right before the disposition request
    async fn validate_deletable(
        &self,
        auth: &AuthContext,
        entity_id: &EntityId,
    ) -> Result<DeletabilityReport, StoreError>;

    /// Transfer-and-reassign or delete-cascade, in one request
    async fn execute_disposition(
        &self,
        auth: &AuthContext,
        request: &DispositionRequest,
    ) -> Result<(), StoreError>;
}
