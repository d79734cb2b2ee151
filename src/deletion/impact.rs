// Impact analysis: how many records depend on the entity being deleted

use tracing::{info, warn};

use crate::auth::AuthContext;
use crate::records::{EntityId, RecordError, RecordKind};
use crate::store::{DataStore, StoreError};

use super::types::DependentRecordCounts;

/// Query the store for dependent counts. Never cached: every open re-queries.
pub async fn analyze_impact<S>(
    store: &S,
    auth: &AuthContext,
    entity_id: &EntityId,
) -> Result<DependentRecordCounts, StoreError>
where
    S: DataStore + ?Sized,
{
    if entity_id.is_empty() {
        return Err(StoreError::InvalidRecord(RecordError::EmptyField {
            kind: RecordKind::Entity,
            field: "id",
        }));
    }

    match store.get_dependent_counts(auth, entity_id).await {
        Ok(counts) => {
            info!(
                %entity_id,
                assigned_tasks = counts.assigned_tasks,
                owned_events = counts.owned_events,
                total_impact = counts.total_impact(),
                "Impact analysis complete"
            );
            Ok(counts)
        }
        Err(e) => {
            warn!(%entity_id, error = %e, "Impact analysis failed");
            Err(e)
        }
    }
}
