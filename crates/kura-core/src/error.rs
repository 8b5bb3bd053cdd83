use thiserror::Error;

/// Core-level errors
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
}
