use thiserror::Error;

use crate::pattern::PatternError;

/// Faults surfaced while matching a request against the registry.
///
/// A missing method is an expected outcome, not a fault: the dispatcher maps
/// it to a `METHOD_NOT_FOUND` error result instead of propagating it.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("no procedure matches method '{method}'")]
    NotFound { method: String },
}

/// Registration-time misconfiguration.
///
/// These are the only faults permitted to escape as `Err`, and only during
/// startup, never during request handling.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("invalid global pattern for parameter '{name}': {source}")]
    InvalidGlobalPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}
