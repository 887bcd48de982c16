use serde::{Deserialize, Serialize};

use crate::error::OperationError;

/// Result of one [`execute`](super::RetryableExecutor::execute) call.
///
/// Both variants carry the total wall-clock time since the first attempt
/// began and the number of attempts that were made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OperationOutcome<T> {
    Success {
        value: T,
        elapsed_ms: u64,
        attempts: u32,
    },
    Failure {
        error: OperationError,
        elapsed_ms: u64,
        attempts: u32,
    },
}

impl<T> OperationOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, OperationOutcome::Success { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            OperationOutcome::Success { attempts, .. }
            | OperationOutcome::Failure { attempts, .. } => *attempts,
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        match self {
            OperationOutcome::Success { elapsed_ms, .. }
            | OperationOutcome::Failure { elapsed_ms, .. } => *elapsed_ms,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            OperationOutcome::Success { value, .. } => Some(value),
            OperationOutcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&OperationError> {
        match self {
            OperationOutcome::Success { .. } => None,
            OperationOutcome::Failure { error, .. } => Some(error),
        }
    }

    /// Drops the timing metadata.
    pub fn into_result(self) -> Result<T, OperationError> {
        match self {
            OperationOutcome::Success { value, .. } => Ok(value),
            OperationOutcome::Failure { error, .. } => Err(error),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> OperationOutcome<U> {
        match self {
            OperationOutcome::Success {
                value,
                elapsed_ms,
                attempts,
            } => OperationOutcome::Success {
                value: f(value),
                elapsed_ms,
                attempts,
            },
            OperationOutcome::Failure {
                error,
                elapsed_ms,
                attempts,
            } => OperationOutcome::Failure {
                error,
                elapsed_ms,
                attempts,
            },
        }
    }
}
