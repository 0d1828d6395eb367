//! History - append-only log of evaluated runs
//!
//! Every successful `run_experiments` call appends exactly one
//! [`RunRecord`]. Records are never pruned; [`Experiment::reset`] starts a
//! fresh history for a new run.
//!
//! [`Experiment::reset`]: super::Experiment::reset

use arrow::compute::concat_batches;

use super::RunRecord;
use crate::table::ResultTable;
use crate::Result;

/// In-memory log of request/response pairs, in call order.
#[derive(Debug, Clone, Default)]
pub struct History {
    records: Vec<RunRecord>,
}

impl History {
    /// Create a new empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of recorded runs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Total number of evaluated rows across all runs.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.records.iter().map(RunRecord::num_rows).sum()
    }

    /// All records in call order.
    #[must_use]
    pub fn records(&self) -> &[RunRecord] {
        &self.records
    }

    /// Most recent record.
    #[must_use]
    pub fn latest(&self) -> Option<&RunRecord> {
        self.records.last()
    }

    /// Record with the given sequence number.
    #[must_use]
    pub fn get(&self, run_id: u64) -> Option<&RunRecord> {
        self.records.iter().find(|r| r.run_id() == run_id)
    }

    /// Sequence number the next record will receive.
    #[must_use]
    pub fn next_run_id(&self) -> u64 {
        self.records.last().map_or(0, |r| r.run_id() + 1)
    }

    /// Every result row recorded so far, as one table.
    ///
    /// Returns `Ok(None)` when the history is empty.
    ///
    /// # Errors
    ///
    /// Returns an Arrow error if recorded tables have incompatible schemas,
    /// which can only happen if records were produced by different domains.
    pub fn data(&self) -> Result<Option<ResultTable>> {
        let Some(first) = self.records.first() else {
            return Ok(None);
        };
        let schema = first.results().schema();
        let batch = concat_batches(&schema, self.records.iter().map(|r| r.results().batch()))?;
        ResultTable::try_from_batch(batch).map(Some)
    }

    pub(crate) fn push(&mut self, record: RunRecord) {
        self.records.push(record);
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }
}
