//! Per-call options for `run_experiments`

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Label recorded when the caller does not name a strategy.
pub const DEFAULT_STRATEGY: &str = "unknown";

/// Options accompanying one batch of conditions.
///
/// ```rust
/// use reactor_bench::experiment::RunOptions;
///
/// let options = RunOptions::new().strategy("SOBO").computation_time(0.42);
/// assert_eq!(options.strategy_label(), "SOBO");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunOptions {
    #[serde(default)]
    strategy: Option<String>,
    #[serde(default)]
    computation_time: Option<f64>,
}

impl RunOptions {
    /// Options with no strategy label and no computation time.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the label of the strategy that proposed the conditions.
    #[must_use]
    pub fn strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    /// Set the time, in seconds, the strategy spent proposing the conditions.
    #[must_use]
    pub const fn computation_time(mut self, seconds: f64) -> Self {
        self.computation_time = Some(seconds);
        self
    }

    /// Strategy label, or [`DEFAULT_STRATEGY`].
    #[must_use]
    pub fn strategy_label(&self) -> &str {
        self.strategy.as_deref().unwrap_or(DEFAULT_STRATEGY)
    }

    /// Reported computation time, if any.
    #[must_use]
    pub const fn computation_seconds(&self) -> Option<f64> {
        self.computation_time
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self.computation_time {
            Some(t) if !t.is_finite() || t < 0.0 => Err(Error::InvalidInput(format!(
                "computation time must be a finite, non-negative number of seconds, got {t}"
            ))),
            _ => Ok(()),
        }
    }
}
