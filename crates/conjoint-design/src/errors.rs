use thiserror::Error;

/// Where a bounded rejection-sampling loop ran out of attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryScope {
    /// Single-profile restrictions rejected every candidate.
    Profile,
    /// Duplicate avoidance could not find a fresh profile.
    Duplicate,
    /// Cross-profile restrictions rejected every assembled task.
    Task,
}

impl std::fmt::Display for RetryScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RetryScope::Profile => "profile",
            RetryScope::Duplicate => "non-duplicate profile",
            RetryScope::Task => "task",
        };
        f.write_str(label)
    }
}

/// Errors emitted by the design engine.
#[derive(Debug, Error)]
pub enum DesignError {
    #[error(transparent)]
    Survey(#[from] conjoint_core::Error),
    #[error("unsatisfiable constraints: no valid {scope} after {attempts} attempts")]
    Unsatisfiable { scope: RetryScope, attempts: u32 },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
