// Transfer target resolution and client-side filtering

use tracing::{info, warn};

use crate::auth::AuthContext;
use crate::listing::{self, ListQuery, SortDirection};
use crate::records::EntityId;
use crate::store::{DataStore, StoreError};

use super::notice::OperatorNotice;
use super::types::{LoadState, TargetSortKey, TransferTarget};

/// What the target-selection step should render
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateView {
    Loading,
    /// The store returned no eligible targets at all
    NoCandidates,
    /// Candidates exist but none match the current filter
    NoMatches { filter: String },
    Candidates(Vec<TransferTarget>),
    Failed(OperatorNotice),
}

/// Fetch eligible targets, sorted by name. The excluded entity is dropped
/// locally as well, whatever the store returns.
pub async fn fetch_candidates<S>(
    store: &S,
    auth: &AuthContext,
    excluding: &EntityId,
) -> Result<Vec<TransferTarget>, StoreError>
where
    S: DataStore + ?Sized,
{
    let fetched = match store.list_transfer_candidates(auth, excluding).await {
        Ok(fetched) => fetched,
        Err(e) => {
            warn!(entity_id = %excluding, error = %e, "Failed to list transfer candidates");
            return Err(e);
        }
    };

    let fetched_count = fetched.len();
    let candidates: Vec<TransferTarget> = fetched
        .into_iter()
        .filter(|candidate| &candidate.id != excluding)
        .collect();
    if candidates.len() != fetched_count {
        warn!(
            entity_id = %excluding,
            "Store returned the entity being deleted as a transfer candidate; dropped it"
        );
    }

    let query = ListQuery::default()
        .sorted(TargetSortKey::DisplayName, SortDirection::Ascending)
        .page(1, candidates.len().max(1));
    let sorted = listing::apply(&candidates, &query).items;

    info!(entity_id = %excluding, candidates = sorted.len(), "Transfer candidates loaded");
    Ok(sorted)
}

/// Pure filter over name and category; never re-fetches
pub fn filter_candidates<'a>(candidates: &'a [TransferTarget], filter: &str) -> Vec<&'a TransferTarget> {
    listing::filter(candidates, filter)
}

pub fn candidate_view(state: &LoadState<Vec<TransferTarget>>, filter: &str) -> CandidateView {
    match state {
        LoadState::NotRequested | LoadState::Loading => CandidateView::Loading,
        LoadState::Failed(notice) => CandidateView::Failed(notice.clone()),
        LoadState::Loaded(candidates) if candidates.is_empty() => CandidateView::NoCandidates,
        LoadState::Loaded(candidates) => {
            let visible: Vec<TransferTarget> = filter_candidates(candidates, filter)
                .into_iter()
                .cloned()
                .collect();
            if visible.is_empty() {
                CandidateView::NoMatches {
                    filter: filter.to_string(),
                }
            } else {
                CandidateView::Candidates(visible)
            }
        }
    }
}
