// Operator-facing error categories and notices

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::store::StoreError;

/// Category shown to the operator for a failed remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    Permission,
    Connectivity,
    DataIntegrity,
    Unspecified,
}

impl ErrorCategory {
    pub fn of(error: &StoreError) -> Self {
        match error {
            StoreError::PermissionDenied(_) => ErrorCategory::Permission,
            StoreError::Connectivity(_) | StoreError::Timeout { .. } => ErrorCategory::Connectivity,
            StoreError::Constraint(_) | StoreError::NotFound { .. } | StoreError::InvalidRecord(_) => {
                ErrorCategory::DataIntegrity
            }
            StoreError::Other(_) => ErrorCategory::Unspecified,
        }
    }

    /// Human-readable message, never just the raw error text
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCategory::Permission => {
                "You do not have permission to perform this action. Ask an administrator for access."
            }
            ErrorCategory::Connectivity => {
                "The records service could not be reached. Check your connection and try again."
            }
            ErrorCategory::DataIntegrity => {
                "The records changed or are still linked to other data, so the change was not applied."
            }
            ErrorCategory::Unspecified => "Something went wrong while processing the request.",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Permission => f.write_str("permission"),
            ErrorCategory::Connectivity => f.write_str("connectivity"),
            ErrorCategory::DataIntegrity => f.write_str("data integrity"),
            ErrorCategory::Unspecified => f.write_str("unspecified"),
        }
    }
}

/// Manual action offered alongside a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetryAction {
    /// Re-run the failed read on the current step
    RetryFetch,
    /// Replay the same disposition request
    RetryDisposition,
}

/// Dismissible, categorized failure shown to the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorNotice {
    pub category: ErrorCategory,
    pub message: String,
    /// Raw underlying error text, for diagnostics only
    pub detail: String,
    pub retry: RetryAction,
}

impl OperatorNotice {
    pub fn from_store_error(error: &StoreError, retry: RetryAction) -> Self {
        let category = ErrorCategory::of(error);
        Self {
            category,
            message: category.message().to_string(),
            detail: error.to_string(),
            retry,
        }
    }

    /// Pre-flight said no: the issues become the diagnostic detail
    pub fn preflight_rejected(issues: &[String]) -> Self {
        let detail = if issues.is_empty() {
            "deletion was rejected without a reason".to_string()
        } else {
            issues.join("; ")
        };
        Self {
            category: ErrorCategory::DataIntegrity,
            message: ErrorCategory::DataIntegrity.message().to_string(),
            detail,
            retry: RetryAction::RetryDisposition,
        }
    }

    pub fn invalid_input(detail: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::Unspecified,
            message: "The request was incomplete and was not sent.".to_string(),
            detail: detail.into(),
            retry: RetryAction::RetryFetch,
        }
    }
}

impl fmt::Display for OperatorNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.detail)
    }
}
