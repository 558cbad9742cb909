use thiserror::Error;

/// Errors surfaced by the engine. An analysis either produces a complete
/// report or fails with one of these — there is no partial-report path.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A transaction record violated an input constraint (negative
    /// amount, missing endpoint). Carries a human-readable description
    /// of the offending record.
    #[error("malformed transaction batch: {0}")]
    MalformedBatch(String),

    /// Cooperative cancellation was observed between detector iterations.
    #[error("analysis cancelled")]
    Cancelled,

    /// An engine configuration option was out of range.
    #[error("invalid engine configuration: {0}")]
    ConfigurationError(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
