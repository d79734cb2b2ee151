// JSON snapshot of the workload store, used by the CLI and integration tests

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

use crate::records::{CalendarEvent, Entity, RecordError, RecordKind, Task};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid {kind} at position {index}: {source}")]
    InvalidRecord {
        kind: RecordKind,
        index: usize,
        #[source]
        source: RecordError,
    },
}

/// Typed contents of a snapshot file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub entities: Vec<Entity>,
    pub tasks: Vec<Task>,
    pub events: Vec<CalendarEvent>,
}

/// Snapshot as it sits on disk, before boundary validation
#[derive(Debug, Default, Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    entities: Vec<Value>,
    #[serde(default)]
    tasks: Vec<Value>,
    #[serde(default)]
    events: Vec<Value>,
}

fn validate_rows<T>(
    kind: RecordKind,
    rows: &[Value],
    parse: fn(&Value) -> Result<T, RecordError>,
) -> Result<Vec<T>, SnapshotError> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            parse(row).map_err(|source| SnapshotError::InvalidRecord { kind, index, source })
        })
        .collect()
}

impl Snapshot {
    pub fn from_json_str(contents: &str) -> Result<Self, SnapshotError> {
        let raw: RawSnapshot = serde_json::from_str(contents)?;
        Ok(Snapshot {
            entities: validate_rows(RecordKind::Entity, &raw.entities, Entity::from_row)?,
            tasks: validate_rows(RecordKind::Task, &raw.tasks, Task::from_row)?,
            events: validate_rows(RecordKind::Event, &raw.events, CalendarEvent::from_row)?,
        })
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).await?;
        let snapshot = Self::from_json_str(&contents)?;
        info!(
            file = ?path,
            entities = snapshot.entities.len(),
            tasks = snapshot.tasks.len(),
            events = snapshot.events.len(),
            "Snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Write to a temporary file first, then rename over the target
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let serialized = serde_json::to_string_pretty(self)?;
        let temp_file = format!("{}.tmp", path.display());
        fs::write(&temp_file, serialized).await?;
        fs::rename(&temp_file, path).await?;

        debug!(file = ?path, "Snapshot saved");
        Ok(())
    }
}
