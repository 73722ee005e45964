//! Error types for pool construction and operation.

use thiserror::Error;

/// Errors produced by the worker pool.
///
/// Note that `submit` and `shutdown` are infallible by contract; only
/// construction can fail.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// An OS worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PoolError::InvalidConfig("max_workers must be at least 1".into());
        assert_eq!(
            format!("{err}"),
            "invalid configuration: max_workers must be at least 1"
        );

        let io = std::io::Error::other("out of threads");
        let err = PoolError::from(io);
        assert!(format!("{err}").starts_with("failed to spawn worker thread"));
    }
}
