// Operator identity passed explicitly into every workflow and store call

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::records::EntityId;

/// Capabilities an operator can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Read workload, counts and candidate lists
    ViewWorkload,
    /// Remove entities and dispose of their dependents
    DeleteEntities,
    /// Complete tasks and undo completions
    ManageTasks,
}

/// The signed-in operator, injected at construction time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub operator_id: EntityId,
    pub display_name: String,
    pub permissions: BTreeSet<Permission>,
}

impl AuthContext {
    pub fn new(
        operator_id: EntityId,
        display_name: impl Into<String>,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> Self {
        Self {
            operator_id,
            display_name: display_name.into(),
            permissions: permissions.into_iter().collect(),
        }
    }

    /// Operator holding every permission
    pub fn administrator(operator_id: EntityId, display_name: impl Into<String>) -> Self {
        Self::new(
            operator_id,
            display_name,
            [
                Permission::ViewWorkload,
                Permission::DeleteEntities,
                Permission::ManageTasks,
            ],
        )
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    pub fn is_operator(&self, entity_id: &EntityId) -> bool {
        &self.operator_id == entity_id
    }
}
