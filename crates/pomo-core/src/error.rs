//! Error taxonomy shared by the engine and every repository backend.

use thiserror::Error;

/// Boxed error from a storage backend.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Interval engine and repository errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The repository holds no intervals yet. Expected on first run.
    #[error("no intervals")]
    NoIntervals,
    /// No interval exists with the given id.
    #[error("interval {0} not found")]
    NotFound(i64),
    /// The storage backend failed.
    #[error("storage error: {0}")]
    Storage(#[source] BoxError),
    /// Pause was requested for an interval that is not running.
    #[error("interval not running")]
    NotRunning,
    /// Start was requested for a done or cancelled interval.
    #[error("interval is completed or cancelled: cannot start")]
    Completed,
    /// A state discriminant outside the known lifecycle.
    #[error("invalid interval state: {0}")]
    InvalidState(i64),
    /// The caller cancelled the running interval.
    #[error("interval cancelled")]
    Cancelled,
}

impl Error {
    /// Wraps a backend error as [`Error::Storage`].
    pub fn storage(err: impl Into<BoxError>) -> Self {
        Self::Storage(err.into())
    }
}

/// Result alias for engine and repository operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
