//! Error types for syllog

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyllogError {
    /// Malformed fact, unsafe rule, or bad configuration key/value
    #[error("validation error: {0}")]
    Validation(String),

    /// Text-syntax parse failure
    #[error("parse error: {0}")]
    Parse(String),

    /// Forward chaining hit the step limit before reaching a fixed point
    #[error("step limit exceeded after {steps} rounds without fixed point")]
    StepLimitExceeded { steps: usize },

    /// Invariant violation: a bug, not a caller error
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, SyllogError>;
