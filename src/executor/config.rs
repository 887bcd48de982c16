use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::OperationError;

/// Static configuration of a [`RetryableExecutor`](super::RetryableExecutor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Total attempts per call, the first one included.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Time budget of a single attempt. Restarts on every attempt.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Emit attempt and outcome log lines.
    #[serde(default = "default_log_enabled")]
    pub log_enabled: bool,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_log_enabled() -> bool {
    true
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            timeout_ms: default_timeout_ms(),
            log_enabled: default_log_enabled(),
        }
    }
}

impl ExecutorConfig {
    pub fn new(max_attempts: u32, timeout_ms: u64) -> Result<Self, OperationError> {
        let config = Self {
            max_attempts,
            timeout_ms,
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.log_enabled = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), OperationError> {
        if self.max_attempts < 1 {
            return Err(OperationError::validation(
                "max_attempts must be at least 1",
                "ExecutorConfig",
            )
            .with_context("maxAttempts", self.max_attempts));
        }
        if self.timeout_ms == 0 {
            return Err(OperationError::validation(
                "timeout_ms must be greater than 0",
                "ExecutorConfig",
            )
            .with_context("timeoutMs", self.timeout_ms));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Delay after a failed `attempt`: `2^attempt * 100` ms, no jitter.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        Duration::from_millis(factor.saturating_mul(100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn default_config_values() {
        let config = ExecutorConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.timeout_ms, 5000);
        assert!(config.log_enabled);
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn exponential_backoff() {
        let config = ExecutorConfig::default();
        assert_eq!(config.backoff_for_attempt(1), Duration::from_millis(200));
        assert_eq!(config.backoff_for_attempt(2), Duration::from_millis(400));
        assert_eq!(config.backoff_for_attempt(3), Duration::from_millis(800));
        assert_eq!(config.backoff_for_attempt(4), Duration::from_millis(1600));
    }

    #[test]
    fn backoff_saturates() {
        let config = ExecutorConfig::default();
        assert_eq!(
            config.backoff_for_attempt(200),
            Duration::from_millis(u64::MAX)
        );
    }

    #[test]
    fn rejects_zero_attempts() {
        let err = ExecutorConfig::new(0, 100).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = ExecutorConfig::new(3, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("timeout_ms"));
    }

    #[test]
    fn deserialize_partial_toml() {
        let config: ExecutorConfig = toml::from_str("max_attempts = 5").unwrap();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.timeout_ms, 5000);
        assert!(config.log_enabled);
    }

    #[test]
    fn logging_toggle() {
        let config = ExecutorConfig::new(1, 10).unwrap().with_logging(false);
        assert!(!config.log_enabled);
    }
}
