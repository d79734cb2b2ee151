// Boundary validation: loosely-typed store rows into typed records

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use super::types::{CalendarEvent, Entity, EntityId, EventId, RecordKind, Task, TaskId, TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("{kind} row is not a JSON object")]
    NotAnObject { kind: RecordKind },
    #[error("{kind} row is missing required field '{field}'")]
    MissingField { kind: RecordKind, field: &'static str },
    #[error("{kind} row has an empty '{field}'")]
    EmptyField { kind: RecordKind, field: &'static str },
    #[error("{kind} row has an invalid '{field}': {value}")]
    InvalidValue {
        kind: RecordKind,
        field: &'static str,
        value: String,
    },
}

fn as_object(kind: RecordKind, row: &Value) -> Result<&Map<String, Value>, RecordError> {
    row.as_object().ok_or(RecordError::NotAnObject { kind })
}

/// Look up the first present field among `names` (the first name is canonical)
fn lookup<'a>(row: &'a Map<String, Value>, names: &[&'static str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| row.get(*name))
        .find(|value| !value.is_null())
}

fn required_str(
    kind: RecordKind,
    row: &Map<String, Value>,
    names: &[&'static str],
) -> Result<String, RecordError> {
    let field = names[0];
    let value = lookup(row, names).ok_or(RecordError::MissingField { kind, field })?;
    let text = match value {
        Value::String(text) => text.clone(),
        // numeric primary keys are common in the hosted store
        Value::Number(number) => number.to_string(),
        other => {
            return Err(RecordError::InvalidValue {
                kind,
                field,
                value: other.to_string(),
            })
        }
    };
    if text.trim().is_empty() {
        return Err(RecordError::EmptyField { kind, field });
    }
    Ok(text)
}

fn optional_str(
    kind: RecordKind,
    row: &Map<String, Value>,
    names: &[&'static str],
) -> Result<Option<String>, RecordError> {
    match lookup(row, names) {
        None => Ok(None),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(_) => required_str(kind, row, names).map(Some),
    }
}

impl Entity {
    pub fn from_row(row: &Value) -> Result<Self, RecordError> {
        let kind = RecordKind::Entity;
        let row = as_object(kind, row)?;
        Ok(Entity {
            id: EntityId::try_new(required_str(kind, row, &["id"])?)?,
            display_name: required_str(kind, row, &["display_name", "full_name", "name"])?,
            category: required_str(kind, row, &["category", "role"])?,
        })
    }
}

impl Task {
    pub fn from_row(row: &Value) -> Result<Self, RecordError> {
        let kind = RecordKind::Task;
        let row = as_object(kind, row)?;

        let raw_status = required_str(kind, row, &["status"])?;
        let status = TaskStatus::parse(&raw_status).ok_or_else(|| RecordError::InvalidValue {
            kind,
            field: "status",
            value: raw_status.clone(),
        })?;

        let due_date = optional_str(kind, row, &["due_date"])?
            .map(|raw| {
                NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| RecordError::InvalidValue {
                    kind,
                    field: "due_date",
                    value: raw,
                })
            })
            .transpose()?;

        Ok(Task {
            id: TaskId::try_new(required_str(kind, row, &["id"])?)?,
            title: required_str(kind, row, &["title"])?,
            status,
            assignee_id: optional_str(kind, row, &["assignee_id", "assigned_to"])?
                .map(EntityId::try_new)
                .transpose()?,
            due_date,
        })
    }
}

impl CalendarEvent {
    pub fn from_row(row: &Value) -> Result<Self, RecordError> {
        let kind = RecordKind::Event;
        let row = as_object(kind, row)?;

        let raw_start = required_str(kind, row, &["starts_at", "start_time"])?;
        let starts_at = DateTime::parse_from_rfc3339(&raw_start)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|_| RecordError::InvalidValue {
                kind,
                field: "starts_at",
                value: raw_start.clone(),
            })?;

        Ok(CalendarEvent {
            id: EventId::try_new(required_str(kind, row, &["id"])?)?,
            title: required_str(kind, row, &["title"])?,
            owner_id: EntityId::try_new(required_str(kind, row, &["owner_id", "created_by"])?)?,
            starts_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_row_accepts_aliases() {
        let entity = Entity::from_row(&json!({
            "id": 42,
            "full_name": "Ana Ruiz",
            "role": "analyst"
        }))
        .unwrap();

        assert_eq!(entity.id.as_str(), "42");
        assert_eq!(entity.display_name, "Ana Ruiz");
        assert_eq!(entity.category, "analyst");
    }

    #[test]
    fn test_entity_row_missing_name_is_rejected() {
        let err = Entity::from_row(&json!({ "id": "e-1", "category": "analyst" })).unwrap_err();
        assert_eq!(
            err,
            RecordError::MissingField {
                kind: RecordKind::Entity,
                field: "display_name"
            }
        );
    }

    #[test]
    fn test_entity_row_empty_id_is_rejected() {
        let err = Entity::from_row(&json!({
            "id": "  ",
            "display_name": "Nobody",
            "category": "clerk"
        }))
        .unwrap_err();
        assert_eq!(
            err,
            RecordError::EmptyField {
                kind: RecordKind::Entity,
                field: "id"
            }
        );
    }

    #[test]
    fn test_task_row_with_optional_fields() {
        let task = Task::from_row(&json!({
            "id": "t-7",
            "title": "File quarterly report",
            "status": "in_progress",
            "assignee_id": "e-1",
            "due_date": "2026-11-02"
        }))
        .unwrap();

        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.assignee_id, Some(EntityId::from("e-1")));
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2026, 11, 2));
    }

    #[test]
    fn test_task_row_unknown_status_is_rejected() {
        let err = Task::from_row(&json!({
            "id": "t-8",
            "title": "Archive",
            "status": "someday"
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            RecordError::InvalidValue { field: "status", .. }
        ));
    }

    #[test]
    fn test_task_row_blank_assignee_is_unassigned() {
        let task = Task::from_row(&json!({
            "id": "t-9",
            "title": "Triage inbox",
            "status": "pending",
            "assignee_id": ""
        }))
        .unwrap();
        assert_eq!(task.assignee_id, None);
    }

    #[test]
    fn test_event_row_parses_rfc3339() {
        let event = CalendarEvent::from_row(&json!({
            "id": "ev-1",
            "title": "Budget review",
            "owner_id": "e-1",
            "starts_at": "2026-10-20T09:30:00+02:00"
        }))
        .unwrap();
        assert_eq!(event.starts_at.to_rfc3339(), "2026-10-20T07:30:00+00:00");
    }

    #[test]
    fn test_non_object_row_is_rejected() {
        let err = CalendarEvent::from_row(&json!(["ev-1"])).unwrap_err();
        assert_eq!(err, RecordError::NotAnObject { kind: RecordKind::Event });
    }
}
