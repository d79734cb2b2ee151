use anyhow::Result;

use crate::cli::commands::{with_desk, Command};
use crate::deletion::impact::analyze_impact;
use crate::deletion::{OperatorNotice, RetryAction};
use crate::records::EntityId;

pub struct ImpactCommand {
    pub entity_id: String,
}

impl ImpactCommand {
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
        }
    }
}

impl Command for ImpactCommand {
    async fn execute(&self) -> Result<()> {
        let entity_id = EntityId::try_new(self.entity_id.clone())?;
        println!("🔍 Analyzing records that depend on {entity_id}...");

        with_desk(|desk| async move {
            match analyze_impact(&*desk.store, &desk.auth, &entity_id).await {
                Ok(counts) => {
                    println!();
                    println!("📋 Assigned tasks:  {}", counts.assigned_tasks);
                    println!("📅 Owned events:    {}", counts.owned_events);
                    println!("📊 Total impact:    {}", counts.total_impact());
                    println!();
                    if counts.has_dependents() {
                        println!("💡 Run 'workload-desk candidates {entity_id}' to pick who takes them over");
                    } else {
                        println!("💡 Nothing depends on {entity_id}; it can be deleted directly");
                    }
                    Ok(())
                }
                Err(e) => {
                    let notice = OperatorNotice::from_store_error(&e, RetryAction::RetryFetch);
                    println!("❌ {notice}");
                    Err(e.into())
                }
            }
        })
        .await
    }
}
