//! Retry-wrapped operations for the device-fleet telemetry backend.
//!
//! The core is [`executor::RetryableExecutor`]: it runs an async operation with
//! a per-attempt timeout and exponential backoff and always hands back an
//! [`executor::OperationOutcome`] instead of an error. [`service::FleetService`]
//! uses it to call the hosted serverless functions (device deletion, group
//! assignment, Telegram/email notifications).

pub mod config;
pub mod error;
pub mod executor;
pub mod functions;
pub mod logging;
pub mod service;

pub use error::{ErrorCode, FleetError, OperationError, Severity};
pub use executor::{ExecutorConfig, OperationOutcome, RetryableExecutor};
