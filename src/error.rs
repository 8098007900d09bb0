//! Error taxonomy for the consensus engine

/// Errors raised by aggregation, consensus analysis and input validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// Malformed or empty ensemble input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Agreement analysis was requested against a merged ranking with no entries.
    #[error("Merged ranking is empty")]
    EmptyRanking,

    /// Upstream merged ranking disagrees with the local one under a `reject` policy.
    #[error("Upstream top breed '{upstream}' disagrees with local top breed '{local}'")]
    UpstreamMismatch { upstream: String, local: String },
}

impl EngineError {
    /// Shorthand for building a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Stable label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::EmptyRanking => "empty_ranking",
            Self::UpstreamMismatch { .. } => "upstream_mismatch",
        }
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
