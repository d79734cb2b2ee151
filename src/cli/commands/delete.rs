use anyhow::{anyhow, bail, Result};
use std::sync::Arc;

use crate::cli::commands::{with_desk, Command};
use crate::deletion::{
    CandidateView, CascadeDeletionWorkflow, DispositionChoice, ExecutionOutcome, WorkflowHost,
    WorkflowStep,
};
use crate::records::EntityId;

/// Prints the workflow's callbacks to the terminal
struct ConsoleHost;

impl WorkflowHost for ConsoleHost {
    fn on_success(&self, entity_id: &EntityId) {
        println!("✅ {entity_id} deleted");
    }

    fn on_close(&self) {
        println!("👋 Deletion workflow closed");
    }
}

pub struct DeleteCommand {
    pub entity_id: String,
    pub transfer_to: Option<String>,
}

impl DeleteCommand {
    pub fn purge(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            transfer_to: None,
        }
    }

    pub fn transfer(entity_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            transfer_to: Some(target_id.into()),
        }
    }

    fn choice(&self) -> DispositionChoice {
        if self.transfer_to.is_some() {
            DispositionChoice::Transfer
        } else {
            DispositionChoice::Delete
        }
    }
}

impl Command for DeleteCommand {
    async fn execute(&self) -> Result<()> {
        let entity_id = EntityId::try_new(self.entity_id.clone())?;
        let target_id = self
            .transfer_to
            .clone()
            .map(EntityId::try_new)
            .transpose()?;

        with_desk(|desk| async move {
            let entity = desk
                .store
                .snapshot()
                .await
                .entities
                .into_iter()
                .find(|entity| entity.id == entity_id)
                .ok_or_else(|| anyhow!("No entity with id {entity_id}"))?;

            println!("🗑️  Deleting {} ({})", entity.display_name, entity.id);
            let workflow =
                CascadeDeletionWorkflow::new(desk.store.clone(), desk.auth.clone(), Arc::new(ConsoleHost));
            workflow.open(entity).await?;

            let Some(view) = workflow.view().await else {
                bail!("workflow closed unexpectedly");
            };
            if let Some(notice) = view.counts.error() {
                println!("❌ {notice}");
                workflow.close().await?;
                bail!("impact analysis failed");
            }
            if let Some(counts) = view.counts.loaded() {
                println!(
                    "📊 Impact: {} task(s), {} event(s)",
                    counts.assigned_tasks, counts.owned_events
                );
            }

            let mut step = workflow.next().await?;
            if step == WorkflowStep::DispositionChoice {
                workflow.select_disposition(self.choice()).await?;
                step = workflow.next().await?;
            } else if target_id.is_some() {
                println!("💡 Nothing to transfer; deleting the entity only");
            }

            if step == WorkflowStep::TransferTarget {
                if let Some(CandidateView::Failed(notice)) =
                    workflow.view().await.map(|view| view.candidates)
                {
                    println!("❌ {notice}");
                    workflow.close().await?;
                    bail!("candidate lookup failed");
                }
                let target_id = target_id.ok_or_else(|| anyhow!("--transfer-to is required"))?;
                if let Err(e) = workflow.select_target(&target_id).await {
                    workflow.close().await?;
                    return Err(e.into());
                }
                workflow.next().await?;
                println!("🔀 Transferring workload to {target_id}");
            }

            match workflow.confirm().await? {
                ExecutionOutcome::Succeeded => desk.persist().await,
                ExecutionOutcome::Failed(notice) => {
                    println!("❌ {notice}");
                    workflow.close().await?;
                    bail!("deletion failed");
                }
                ExecutionOutcome::AlreadyInFlight => bail!("a deletion request is already in flight"),
            }
        })
        .await
    }
}
