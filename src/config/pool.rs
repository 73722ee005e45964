//! Pool configuration structure.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default idle limit applied when none is configured.
const DEFAULT_MAX_IDLE_MS: u64 = 30_000;

/// Worker pool configuration.
///
/// Both values are fixed for the pool's lifetime once passed to
/// [`WorkerPool::new`](crate::core::WorkerPool::new).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Upper bound on concurrently live workers. Must be at least 1.
    pub max_workers: usize,
    /// A worker idle longer than this self-terminates, shrinking the pool.
    pub max_idle_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_workers: num_cpus::get(),
            max_idle_ms: DEFAULT_MAX_IDLE_MS,
        }
    }
}

impl PoolConfig {
    /// Create a configuration with default values: one worker per logical
    /// CPU and a 30 second idle limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of concurrently live workers.
    #[must_use]
    pub const fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Set the idle limit after which a worker self-terminates.
    ///
    /// Sub-millisecond precision is truncated.
    #[must_use]
    pub const fn with_max_idle(mut self, max_idle: Duration) -> Self {
        self.max_idle_ms = max_idle.as_millis() as u64;
        self
    }

    /// The idle limit as a [`Duration`].
    #[must_use]
    pub const fn max_idle(&self) -> Duration {
        Duration::from_millis(self.max_idle_ms)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_workers == 0 {
            return Err("max_workers must be at least 1".into());
        }
        if self.max_idle_ms == 0 {
            return Err("max_idle_ms must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse a pool configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a message if the input fails to parse or validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
