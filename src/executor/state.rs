use std::fmt;

/// Per-call lifecycle of an `execute` invocation.
///
/// Each call flows through: PENDING → ATTEMPTING(1) → { SUCCEEDED | RETRY_WAITING(n) → ATTEMPTING(n+1) | FAILED }
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Pending,
    Attempting(u32),
    RetryWaiting(u32),
    Succeeded,
    Failed,
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptState::Pending => write!(f, "PENDING"),
            AttemptState::Attempting(n) => write!(f, "ATTEMPTING({n})"),
            AttemptState::RetryWaiting(n) => write!(f, "RETRY_WAITING({n})"),
            AttemptState::Succeeded => write!(f, "SUCCEEDED"),
            AttemptState::Failed => write!(f, "FAILED"),
        }
    }
}

/// What happened in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Start,
    AttemptSucceeded,
    AttemptFailed,
    BackoffElapsed,
}

impl AttemptState {
    /// Computes the state that follows `self` after `event`.
    ///
    /// Events that do not apply to the current state leave it unchanged;
    /// terminal states never move.
    pub fn next(self, event: Transition, max_attempts: u32) -> AttemptState {
        match (self, event) {
            (AttemptState::Pending, Transition::Start) => AttemptState::Attempting(1),
            (AttemptState::Attempting(_), Transition::AttemptSucceeded) => AttemptState::Succeeded,
            (AttemptState::Attempting(n), Transition::AttemptFailed) => {
                if n < max_attempts {
                    AttemptState::RetryWaiting(n)
                } else {
                    AttemptState::Failed
                }
            }
            (AttemptState::RetryWaiting(n), Transition::BackoffElapsed) => {
                AttemptState::Attempting(n + 1)
            }
            (state, _) => state,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AttemptState::Succeeded | AttemptState::Failed)
    }
}
