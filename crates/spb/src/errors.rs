use thiserror::Error;

/// A result type for spatially balanced sampling
pub type Result<T> = std::result::Result<T, SpbError>;

/// An error when drawing samples with [`Hpwd`](crate::Hpwd) or [`Swd`](crate::Swd)
#[derive(Error, Debug)]
pub enum SpbError {
    /// When a sampling parameter is invalid
    #[error("InvalidValue error: {0}")]
    InvalidValueError(String),
    /// When the distance matrix breaks the input contract
    #[error("Invalid distance matrix: {0}")]
    InvalidDistanceMatrix(String),
    /// When the selection weights of the remaining units sum to zero
    #[error("Degenerate weight vector at draw {step} of replication {replication}")]
    DegenerateWeights {
        /// Replication number (1-based)
        replication: usize,
        /// Draw step number (1-based)
        step: usize,
    },
    /// When a sample unit is at null distance from every sample member
    #[error("Degenerate distance sum for unit {unit} in replication {replication}")]
    DegenerateDistanceSum {
        /// Replication number (1-based)
        replication: usize,
        /// Unit identifier (1-based)
        unit: usize,
    },
    /// When the random generator lock is poisoned
    #[error("Random generator lock poisoned")]
    RngLockError,
}
