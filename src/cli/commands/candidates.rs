use anyhow::Result;

use crate::cli::commands::{with_desk, Command};
use crate::deletion::candidates::{candidate_view, fetch_candidates};
use crate::deletion::{CandidateView, LoadState, OperatorNotice, RetryAction};
use crate::records::EntityId;

pub struct CandidatesCommand {
    pub entity_id: String,
    pub filter: Option<String>,
}

impl CandidatesCommand {
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }
}

impl Command for CandidatesCommand {
    async fn execute(&self) -> Result<()> {
        let entity_id = EntityId::try_new(self.entity_id.clone())?;
        let filter = self.filter.clone().unwrap_or_default();

        with_desk(|desk| async move {
            let state = match fetch_candidates(&*desk.store, &desk.auth, &entity_id).await {
                Ok(list) => LoadState::Loaded(list),
                Err(e) => LoadState::Failed(OperatorNotice::from_store_error(&e, RetryAction::RetryFetch)),
            };

            match candidate_view(&state, &filter) {
                CandidateView::Candidates(list) => {
                    println!("👥 {} candidate(s) can receive {entity_id}'s workload:", list.len());
                    for candidate in list {
                        println!("   • {} ({}) [{}]", candidate.display_name, candidate.id, candidate.category);
                    }
                    println!();
                    println!("💡 Run 'workload-desk delete {entity_id} --transfer-to <ID>'");
                }
                CandidateView::NoCandidates => {
                    println!("📋 No other entities exist to receive the workload");
                    println!("   💡 Use 'workload-desk delete {entity_id} --purge' instead");
                }
                CandidateView::NoMatches { filter } => {
                    println!("📋 No candidates match \"{filter}\"");
                }
                CandidateView::Failed(notice) => {
                    println!("❌ {notice}");
                    anyhow::bail!("candidate lookup failed");
                }
                CandidateView::Loading => {}
            }
            Ok(())
        })
        .await
    }
}
