mod config;
mod outcome;
mod retry;
mod state;

pub use config::ExecutorConfig;
pub use outcome::OperationOutcome;
pub use retry::RetryableExecutor;
pub use state::{AttemptState, Transition};
