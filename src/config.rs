//! Benchmark configuration
//!
//! ```rust
//! use reactor_bench::config::BenchmarkConfig;
//!
//! let config = BenchmarkConfig::from_json(r#"{"noise_level": 2.5, "seed": 42}"#)?;
//! let bench = config.build()?;
//! assert_eq!(bench.seed(), Some(42));
//! # Ok::<(), reactor_bench::Error>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::benchmarks::DeprotectionBenchmark;
use crate::Result;

/// Construction parameters for a benchmark.
///
/// Missing fields fall back to their defaults: no noise, entropy seeding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchmarkConfig {
    /// Standard deviation of the measurement noise, percent of the signal.
    pub noise_level: f64,
    /// Generator seed; `None` seeds from OS entropy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl BenchmarkConfig {
    /// Parse a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`](crate::Error::Serialization) on
    /// malformed JSON or unknown fields.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a deprotection benchmark from this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`](crate::Error::InvalidInput) if the
    /// noise level is negative or not finite.
    pub fn build(&self) -> Result<DeprotectionBenchmark> {
        DeprotectionBenchmark::builder().config(self).build()
    }
}
