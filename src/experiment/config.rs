//! Configuration for running a factorial experiment
//!
//! Controls the simulated horizon of each cell, the seed stream and whether
//! cells are executed one after another or spread over a Rayon pool.

use crate::restaurant::simulation::DAY_SECONDS;

/// Enumeration of supported concurrency modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcurrencyMode {
    /// Cells run one after another on the calling thread
    Sequential,
    /// Cells run on a Rayon pool; each still owns an isolated simulation
    Rayon,
}

impl Default for ConcurrencyMode {
    fn default() -> Self {
        ConcurrencyMode::Sequential
    }
}

/// Configuration for experiment execution
///
/// Cell `i` is simulated with seed `base_seed + i`, so the dataset does not
/// depend on the concurrency mode.
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    /// Simulated seconds per cell
    pub horizon: f64,
    /// Seed of the first cell
    pub base_seed: u64,
    /// The concurrency mode to use for execution
    pub concurrency_mode: ConcurrencyMode,
    /// The size of the thread pool for parallel execution
    /// Only relevant when concurrency_mode is Rayon
    pub thread_pool_size: Option<usize>,
}

impl ExperimentConfig {
    /// Create a new experiment configuration with default values
    ///
    /// Default configuration simulates one day per cell, sequentially
    pub fn new() -> Self {
        Self {
            horizon: DAY_SECONDS,
            base_seed: 0,
            concurrency_mode: ConcurrencyMode::default(),
            thread_pool_size: None,
        }
    }

    pub fn with_horizon(mut self, seconds: f64) -> Self {
        self.horizon = seconds;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.base_seed = seed;
        self
    }

    /// Set the concurrency mode for the experiment
    pub fn with_concurrency(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency_mode = mode;
        self
    }

    /// Set the thread pool size for parallel execution
    ///
    /// # Note
    /// This setting only affects execution when concurrency_mode is Rayon
    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }

    /// Seed used for the cell at `index`
    pub fn cell_seed(&self, index: usize) -> u64 {
        self.base_seed.wrapping_add(index as u64)
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self::new()
    }
}
