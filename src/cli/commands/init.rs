use anyhow::{anyhow, bail, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::commands::Command;
use crate::config::DeskConfig;
use crate::records::EntityId;

const CONFIG_FILE: &str = "workload-desk.toml";

pub struct InitCommand {
    pub operator: Option<String>,
    pub snapshot: Option<PathBuf>,
    pub force: bool,
}

impl InitCommand {
    /// Starting configuration: defaults with the flags applied
    pub fn starter_config(&self) -> Result<DeskConfig> {
        let mut config = DeskConfig::default();
        if let Some(operator) = &self.operator {
            config.operator.id = EntityId::try_new(operator.clone())?.to_string();
        }
        if let Some(snapshot) = &self.snapshot {
            config.store.snapshot_path = snapshot.clone();
        }
        Ok(config)
    }

    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() && !self.force {
            bail!(
                "{} already exists; pass --force to overwrite it",
                config_path.display()
            );
        }

        self.starter_config()?
            .save_to_file(&config_path)
            .map_err(|e| anyhow!("Failed to save configuration: {}", e))?;
        info!(path = %config_path.display(), "Wrote starter configuration");
        Ok(config_path)
    }
}

impl Command for InitCommand {
    async fn execute(&self) -> Result<()> {
        print!("⚙️  Writing {CONFIG_FILE}... ");
        std::io::stdout().flush()?;

        match self.write_to(Path::new(".")) {
            Ok(_) => {
                println!("✅");
                println!();
                println!("Grant permissions under [operator] before deleting records.");
                Ok(())
            }
            Err(e) => {
                println!("❌ {e:#}");
                Err(e)
            }
        }
    }
}
