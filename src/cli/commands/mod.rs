use anyhow::{Context, Result};
use std::io::Write;
use std::sync::Arc;

use crate::auth::AuthContext;
use crate::config::{self, DeskConfig};
use crate::store::{InMemoryStore, Snapshot};

pub mod candidates;
pub mod complete;
pub mod delete;
pub mod impact;
pub mod init;
pub mod tasks;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// Snapshot-backed store plus the configured operator
pub struct Desk {
    pub config: DeskConfig,
    pub auth: AuthContext,
    pub store: Arc<InMemoryStore>,
}

impl Desk {
    pub async fn load(config: &DeskConfig) -> Result<Self> {
        let auth = config.auth_context()?;
        let path = &config.store.snapshot_path;
        let snapshot = Snapshot::load(path)
            .await
            .with_context(|| format!("Failed to load snapshot from {}", path.display()))?;

        let mut store = InMemoryStore::new(snapshot);
        if let Some(latency) = config.simulated_latency() {
            store = store.with_latency(latency);
        }

        Ok(Self {
            config: config.clone(),
            auth,
            store: Arc::new(store),
        })
    }

    /// Write the store's current contents back to the snapshot file
    pub async fn persist(&self) -> Result<()> {
        let path = &self.config.store.snapshot_path;
        self.store
            .snapshot()
            .await
            .save(path)
            .await
            .with_context(|| format!("Failed to save snapshot to {}", path.display()))
    }
}

pub async fn with_desk<F, Fut, R>(f: F) -> Result<R>
where
    F: FnOnce(Desk) -> Fut,
    Fut: std::future::Future<Output = Result<R>>,
{
    print!("🔄 Loading workload snapshot... ");
    std::io::stdout().flush()?;

    let config = config::config()?;
    match Desk::load(config).await {
        Ok(desk) => {
            println!("✅");
            f(desk).await
        }
        Err(e) => {
            println!("❌ {e:#}");
            Err(e)
        }
    }
}

pub async fn show_how_to_get_started() -> Result<()> {
    println!("🗂️  Workload Desk");
    println!();
    println!("First run:");
    println!("  ⚙️  workload-desk init --operator <ID>");
    println!();
    println!("Before deleting a record:");
    println!("  🔍 workload-desk impact <ENTITY>        # What depends on it");
    println!("  👥 workload-desk candidates <ENTITY>    # Who can take it over");
    println!();
    println!("Then:");
    println!("  🔀 workload-desk delete <ENTITY> --transfer-to <TARGET>");
    println!("  🗑️  workload-desk delete <ENTITY> --purge");
    println!();
    println!("Tasks:");
    println!("  📋 workload-desk tasks --search <TEXT>");
    println!("  ✅ workload-desk complete <TASK>");
    Ok(())
}
