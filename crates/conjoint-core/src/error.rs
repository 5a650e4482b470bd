use thiserror::Error;

/// Core error type shared across conjoint crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The survey input violates a structural invariant.
    #[error("invalid survey: {0}")]
    InvalidSurvey(String),
    /// A requested feature is not supported.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Convenience alias for results returned by conjoint crates.
pub type Result<T> = std::result::Result<T, Error>;
