//! Force step configuration.

use lamina_types::constants::DEFAULT_PARALLEL_THRESHOLD;
use serde::{Deserialize, Serialize};

/// Configuration for [`MeshForceStep`](crate::step::MeshForceStep).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceStepConfig {
    /// Bond count at which triangle and bending evaluation moves onto the
    /// rayon thread pool. Smaller batches run on the calling thread.
    pub parallel_threshold: usize,

    /// Whether the step report carries summed membrane energies.
    pub track_energy: bool,
}

impl Default for ForceStepConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            track_energy: false,
        }
    }
}

impl ForceStepConfig {
    /// Always evaluate on the calling thread.
    pub fn sequential() -> Self {
        Self {
            parallel_threshold: usize::MAX,
            ..Default::default()
        }
    }

    /// Always evaluate on the thread pool, with energy tracking.
    pub fn parallel() -> Self {
        Self {
            parallel_threshold: 0,
            track_energy: true,
        }
    }

    pub fn with_energy(mut self) -> Self {
        self.track_energy = true;
        self
    }

    /// Whether a batch of `count` bonds goes onto the thread pool.
    #[inline]
    pub fn runs_parallel(&self, count: usize) -> bool {
        count >= self.parallel_threshold
    }
}
