//! Run Record - one `run_experiments` call as stored in the history

use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};

use super::Extras;
use crate::table::ResultTable;

/// Run Record captures a single request/response pair.
///
/// The history holds one record per successful call to
/// [`run_experiments`](super::Experiment::run_experiments), in call order.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    run_id: u64,
    strategy: String,
    conditions: RecordBatch,
    results: ResultTable,
    extras: Vec<Extras>,
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
}

impl RunRecord {
    /// Create a builder for a run record.
    ///
    /// # Arguments
    ///
    /// * `run_id` - Sequence number within the experiment's history
    /// * `conditions` - Conditions table exactly as submitted
    /// * `results` - Result table returned to the caller
    #[must_use]
    pub fn builder(run_id: u64, conditions: RecordBatch, results: ResultTable) -> RunRecordBuilder {
        RunRecordBuilder::new(run_id, conditions, results)
    }

    /// Get the run sequence number.
    #[must_use]
    pub const fn run_id(&self) -> u64 {
        self.run_id
    }

    /// Get the strategy label supplied with the call.
    #[must_use]
    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    /// Get the submitted conditions.
    #[must_use]
    pub const fn conditions(&self) -> &RecordBatch {
        &self.conditions
    }

    /// Get the returned results.
    #[must_use]
    pub const fn results(&self) -> &ResultTable {
        &self.results
    }

    /// Get the per-row extras.
    #[must_use]
    pub fn extras(&self) -> &[Extras] {
        &self.extras
    }

    /// Get the timestamp at which evaluation started.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Get the timestamp at which evaluation finished.
    #[must_use]
    pub const fn ended_at(&self) -> DateTime<Utc> {
        self.ended_at
    }

    /// Number of evaluated rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.results.num_rows()
    }
}

/// Builder for `RunRecord`.
#[derive(Debug)]
pub struct RunRecordBuilder {
    run_id: u64,
    strategy: String,
    conditions: RecordBatch,
    results: ResultTable,
    extras: Vec<Extras>,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl RunRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(run_id: u64, conditions: RecordBatch, results: ResultTable) -> Self {
        Self {
            run_id,
            strategy: super::DEFAULT_STRATEGY.to_string(),
            conditions,
            results,
            extras: Vec::new(),
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Set the strategy label.
    #[must_use]
    pub fn strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = strategy.into();
        self
    }

    /// Set the per-row extras.
    #[must_use]
    pub fn extras(mut self, extras: Vec<Extras>) -> Self {
        self.extras = extras;
        self
    }

    /// Set a custom start timestamp.
    #[must_use]
    pub const fn started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = started_at;
        self
    }

    /// Set a custom end timestamp (defaults to the build time).
    #[must_use]
    pub const fn ended_at(mut self, ended_at: DateTime<Utc>) -> Self {
        self.ended_at = Some(ended_at);
        self
    }

    /// Build the `RunRecord`.
    #[must_use]
    pub fn build(self) -> RunRecord {
        RunRecord {
            run_id: self.run_id,
            strategy: self.strategy,
            conditions: self.conditions,
            results: self.results,
            extras: self.extras,
            started_at: self.started_at,
            ended_at: self.ended_at.unwrap_or_else(Utc::now),
        }
    }
}
