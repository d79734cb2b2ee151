use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::auth::{AuthContext, Permission};
use crate::records::EntityId;

/// Main configuration structure for the workload desk
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeskConfig {
    /// Identity of the operator running the desk
    pub operator: OperatorConfig,
    /// Data store settings
    pub store: StoreConfig,
    /// Task completion settings
    pub completion: CompletionConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OperatorConfig {
    /// Entity id of the operator
    pub id: String,
    pub display_name: String,
    pub permissions: BTreeSet<Permission>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// JSON snapshot used by the reference store
    pub snapshot_path: PathBuf,
    /// Simulated round-trip latency in milliseconds (0 disables)
    pub simulated_latency_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompletionConfig {
    /// How long a completed task can be restored
    pub undo_window_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level directive, e.g. "info" or "workload_desk=debug"
    pub log_level: String,
    /// Emit JSON lines instead of human-readable logs
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: true,
        }
    }
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            operator: OperatorConfig {
                id: "operator".to_string(),
                display_name: "Desk Operator".to_string(),
                permissions: [Permission::ViewWorkload, Permission::ManageTasks]
                    .into_iter()
                    .collect(),
            },
            store: StoreConfig {
                snapshot_path: PathBuf::from(".workload-desk/snapshot.json"),
                simulated_latency_ms: 0,
            },
            completion: CompletionConfig {
                undo_window_seconds: 10,
            },
            observability: ObservabilityConfig::default(),
        }
    }
}

impl DeskConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (workload-desk.toml, .workload-desk-rc)
    /// 3. Environment variables (prefixed with WORKLOAD_DESK_)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Same as [`DeskConfig::load`], resolving files relative to `dir`
    pub fn load_from(dir: &Path) -> Result<Self> {
        let defaults = Config::try_from(&DeskConfig::default())
            .context("Failed to build default configuration")?;
        let mut builder = Config::builder().add_source(defaults);

        let toml_file = dir.join("workload-desk.toml");
        if toml_file.exists() {
            builder = builder.add_source(File::from(toml_file));
        }

        let rc_file = dir.join(".workload-desk-rc");
        if rc_file.exists() {
            builder = builder.add_source(File::from(rc_file).format(config::FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("WORKLOAD_DESK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to read configuration sources")?;
        let desk_config: DeskConfig = config
            .try_deserialize()
            .context("Configuration has an invalid shape")?;
        Ok(desk_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        Self::load_env_file_from(Path::new("."))
    }

    /// Same as [`DeskConfig::load_env_file`], looking for `.env` in `dir`
    pub fn load_env_file_from(dir: &Path) -> Result<()> {
        let env_file = dir.join(".env");
        if env_file.exists() {
            dotenvy::from_path(&env_file)
                .with_context(|| format!("Failed to parse {}", env_file.display()))?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }

    pub fn auth_context(&self) -> Result<AuthContext> {
        let operator_id = EntityId::try_new(self.operator.id.clone())
            .context("operator.id must not be empty")?;
        Ok(AuthContext::new(
            operator_id,
            self.operator.display_name.clone(),
            self.operator.permissions.iter().copied(),
        ))
    }

    pub fn undo_window(&self) -> Duration {
        Duration::from_secs(self.completion.undo_window_seconds)
    }

    pub fn simulated_latency(&self) -> Option<Duration> {
        match self.store.simulated_latency_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

/// A malformed .env is skipped, not fatal. Held until logging is up.
static ENV_FILE_ERROR: std::sync::OnceLock<String> = std::sync::OnceLock::new();

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<DeskConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        // Load .env file first
        if let Err(e) = DeskConfig::load_env_file() {
            let _ = ENV_FILE_ERROR.set(format!("{e:#}"));
        }
        DeskConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static DeskConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup, once telemetry is installed)
pub fn init_config() -> Result<()> {
    let _config = config()?;
    if let Some(error) = ENV_FILE_ERROR.get() {
        tracing::warn!(%error, "Ignoring unreadable .env file");
    }
    tracing::info!("Configuration loaded successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_use_ten_second_undo_window() {
        let config = DeskConfig::default();
        assert_eq!(config.undo_window(), Duration::from_secs(10));
        assert_eq!(config.simulated_latency(), None);
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("workload-desk.toml"),
            r#"
[operator]
id = "hr-admin"
display_name = "HR Admin"
permissions = ["view_workload", "delete_entities"]

[completion]
undo_window_seconds = 5
"#,
        )
        .unwrap();

        let config = DeskConfig::load_from(temp_dir.path()).unwrap();
        assert_eq!(config.completion.undo_window_seconds, 5);
        assert_eq!(config.observability.log_level, "info");

        let auth = config.auth_context().unwrap();
        assert_eq!(auth.operator_id, EntityId::from("hr-admin"));
        assert!(auth.can(Permission::DeleteEntities));
        assert!(!auth.can(Permission::ManageTasks));
    }

    #[test]
    fn test_save_round_trips_through_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("workload-desk.toml");
        DeskConfig::default().save_to_file(&path).unwrap();

        let config = DeskConfig::load_from(temp_dir.path()).unwrap();
        assert_eq!(config.operator.id, "operator");
        assert_eq!(
            config.store.snapshot_path,
            PathBuf::from(".workload-desk/snapshot.json")
        );
    }

    #[test]
    fn test_malformed_env_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(".env"), "this line has no equals sign\n").unwrap();

        let err = DeskConfig::load_env_file_from(temp_dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains(".env"));
    }

    #[test]
    fn test_missing_env_file_is_fine() {
        let temp_dir = TempDir::new().unwrap();
        assert!(DeskConfig::load_env_file_from(temp_dir.path()).is_ok());
    }
}
