//! Error model shared by the executor, the function client and the CLI.
//!
//! [`OperationError`] is the value carried inside a failed
//! [`OperationOutcome`](crate::executor::OperationOutcome); it is plain data and
//! never needs to be propagated with `?` by callers of the executor.
//! [`FleetError`] covers the outer surfaces (configuration files, CLI).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Classification of an [`OperationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Timeout,
    OperationFailed,
    ValidationError,
    NotFound,
    Unauthorized,
    RateLimitExceeded,
    DatabaseError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::OperationFailed => "OPERATION_FAILED",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
        }
    }

    /// Severity used when an error is built without an explicit one.
    pub fn default_severity(&self) -> Severity {
        match self {
            ErrorCode::Timeout | ErrorCode::Unauthorized => Severity::High,
            ErrorCode::OperationFailed | ErrorCode::RateLimitExceeded => Severity::Medium,
            ErrorCode::ValidationError | ErrorCode::NotFound => Severity::Low,
            ErrorCode::DatabaseError => Severity::Critical,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logging priority of an error. Never consulted for control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// A structured failure: what went wrong, where, and how loud to log it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("[{code}] {message}")]
pub struct OperationError {
    pub message: String,
    pub code: ErrorCode,
    /// Component or operation that produced the error.
    pub origin: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,
}

impl OperationError {
    pub fn new(code: ErrorCode, message: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
            origin: origin.into(),
            severity: code.default_severity(),
            context: None,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// The attempt did not settle within `timeout_ms`.
    pub fn timeout(operation: &str, timeout_ms: u64) -> Self {
        Self::new(
            ErrorCode::Timeout,
            format!("{operation} timed out after {timeout_ms}ms"),
            operation,
        )
        .with_severity(Severity::High)
        .with_context("operation", operation)
        .with_context("timeoutMs", timeout_ms)
    }

    /// Wraps whatever the operation failed with. If the underlying error is
    /// already an `OperationError` its code is kept under `originalCode`.
    pub fn operation_failed(error: &anyhow::Error, operation: &str, attempt: u32) -> Self {
        let original_code = error.downcast_ref::<OperationError>().map(|e| e.code);
        let message = match error.downcast_ref::<OperationError>() {
            Some(inner) => inner.message.clone(),
            None => format!("{error:#}"),
        };

        let mut wrapped = Self::new(ErrorCode::OperationFailed, message, operation)
            .with_severity(Severity::Medium)
            .with_context("operation", operation)
            .with_context("attempt", attempt)
            .with_context("originalError", format!("{error:#}"));
        if let Some(code) = original_code {
            wrapped = wrapped.with_context("originalCode", code.as_str());
        }
        wrapped
    }

    pub fn validation(message: impl Into<String>, origin: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message, origin)
    }

    /// Looks up a single context entry.
    pub fn context_value(&self, key: &str) -> Option<&Value> {
        self.context.as_ref().and_then(|ctx| ctx.get(key))
    }
}
