use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, error, info, warn};

use super::config::ExecutorConfig;
use super::outcome::OperationOutcome;
use super::state::{AttemptState, Transition};
use crate::error::OperationError;

/// Runs async operations with a per-attempt timeout and exponential backoff.
///
/// The executor only holds its configuration, so a single instance can be
/// shared by any number of concurrent `execute` calls.
///
/// When an attempt times out its future is dropped and never polled again.
/// Anything the operation already handed to a spawned task keeps running in
/// the background; callers that need real cancellation must pass their own
/// signal into the operation.
#[derive(Debug, Clone, Default)]
pub struct RetryableExecutor {
    config: ExecutorConfig,
}

impl RetryableExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Executes `operation` until it succeeds or `max_attempts` is reached.
    ///
    /// Never returns an error and never panics on behalf of the operation:
    /// failures, timeouts and panics all end up in [`OperationOutcome::Failure`],
    /// which carries the error of the last attempt.
    pub async fn execute<T, E, F, Fut>(&self, mut operation: F, operation_name: &str) -> OperationOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<anyhow::Error>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let started = Instant::now();
        let mut state = AttemptState::Pending.next(Transition::Start, max_attempts);
        let mut attempt = 1;

        loop {
            if self.config.log_enabled {
                debug!(operation = operation_name, attempt, max_attempts, %state, "attempt started");
            }
            let attempt_started = Instant::now();

            match self.run_attempt(&mut operation, operation_name, attempt).await {
                Ok(value) => {
                    state = state.next(Transition::AttemptSucceeded, max_attempts);
                    let elapsed_ms = millis_since(started);
                    if self.config.log_enabled {
                        info!(
                            operation = operation_name,
                            attempts = attempt,
                            duration_ms = elapsed_ms,
                            %state,
                            "operation succeeded"
                        );
                    }
                    return OperationOutcome::Success {
                        value,
                        elapsed_ms,
                        attempts: attempt,
                    };
                }
                Err(err) => {
                    state = state.next(Transition::AttemptFailed, max_attempts);
                    if self.config.log_enabled {
                        warn!(
                            operation = operation_name,
                            attempt,
                            max_attempts,
                            duration_ms = millis_since(attempt_started),
                            code = %err.code,
                            error = %err.message,
                            %state,
                            "attempt failed"
                        );
                    }

                    if state.is_terminal() {
                        let elapsed_ms = millis_since(started);
                        if self.config.log_enabled {
                            error!(
                                operation = operation_name,
                                attempts = attempt,
                                duration_ms = elapsed_ms,
                                code = %err.code,
                                severity = %err.severity,
                                error = %err.message,
                                "operation failed"
                            );
                        }
                        return OperationOutcome::Failure {
                            error: err,
                            elapsed_ms,
                            attempts: attempt,
                        };
                    }

                    let delay = self.config.backoff_for_attempt(attempt);
                    if self.config.log_enabled {
                        debug!(
                            operation = operation_name,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "waiting before retry"
                        );
                    }
                    sleep(delay).await;
                    state = state.next(Transition::BackoffElapsed, max_attempts);
                    attempt += 1;
                }
            }
        }
    }

    /// One attempt: builds the future, races it against the timeout and
    /// converts every failure mode into an `OperationError`.
    async fn run_attempt<T, E, F, Fut>(
        &self,
        operation: &mut F,
        operation_name: &str,
        attempt: u32,
    ) -> Result<T, OperationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<anyhow::Error>,
    {
        let future = match std::panic::catch_unwind(AssertUnwindSafe(|| operation())) {
            Ok(future) => future,
            Err(payload) => return Err(panic_error(payload, operation_name, attempt)),
        };

        match timeout(self.config.timeout(), AssertUnwindSafe(future).catch_unwind()).await {
            Err(_) => Err(OperationError::timeout(operation_name, self.config.timeout_ms)),
            Ok(Err(payload)) => Err(panic_error(payload, operation_name, attempt)),
            Ok(Ok(Err(e))) => Err(OperationError::operation_failed(
                &e.into(),
                operation_name,
                attempt,
            )),
            Ok(Ok(Ok(value))) => Ok(value),
        }
    }
}

fn panic_error(payload: Box<dyn Any + Send>, operation_name: &str, attempt: u32) -> OperationError {
    let reason = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    let err = anyhow::anyhow!("operation panicked: {reason}");
    OperationError::operation_failed(&err, operation_name, attempt).with_context("panicked", true)
}

fn millis_since(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
