//! Experiment protocol
//!
//! An [`Experiment`] evaluates batches of proposed conditions against its
//! [`Domain`] and returns the conditions augmented with measured objectives.
//! Concrete experiments supply the per-row model ([`Experiment::evaluate`])
//! and own their state (history, random generator); the provided
//! [`Experiment::run_experiments`] does schema checking, timing, table
//! assembly and history logging.
//!
//! ## Schema Overview
//!
//! ```text
//! Experiment ──< RunRecord (one per run_experiments call)
//!                    ├── conditions (RecordBatch, as submitted)
//!                    ├── results    (ResultTable, DATA + METADATA columns)
//!                    └── extras     (one map per row)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use reactor_bench::benchmarks::DeprotectionBenchmark;
//! use reactor_bench::experiment::{Experiment, RunOptions};
//! use reactor_bench::table::conditions_from_rows;
//!
//! let mut bench = DeprotectionBenchmark::new(0.0)?;
//! let conditions = conditions_from_rows(bench.domain(), &[[7.0, 0.39, 160.0]])?;
//!
//! let (results, extras) = bench.run_experiments(&conditions, &RunOptions::new())?;
//! assert_eq!(results.num_rows(), 1);
//! assert!(results.value(0, "Conv").is_some());
//! assert_eq!(extras.len(), 1);
//! assert_eq!(bench.history().len(), 1);
//! # Ok::<(), reactor_bench::Error>(())
//! ```

mod history;
mod options;
mod run_record;
mod state;

pub use history::History;
pub use options::{RunOptions, DEFAULT_STRATEGY};
pub use run_record::{RunRecord, RunRecordBuilder};
pub use state::{ExperimentState, RESERVED_KEYS};

use std::collections::BTreeMap;
use std::time::Instant;

use arrow::record_batch::RecordBatch;
use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info, info_span, trace, warn};

use crate::domain::Domain;
use crate::table::{assemble, ConditionColumns, ConditionRow, ResultTable, RowMetadata};
use crate::{Error, Result};

/// Auxiliary, model-specific output attached to one evaluated row.
pub type Extras = BTreeMap<String, Value>;

/// Outcome of evaluating a single condition row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    objectives: Vec<(String, f64)>,
    extras: Extras,
}

impl Evaluation {
    /// Create an empty evaluation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an objective value. A repeated name overwrites the earlier value.
    #[must_use]
    pub fn objective(mut self, name: impl Into<String>, value: f64) -> Self {
        let name = name.into();
        match self.objectives.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.objectives.push((name, value)),
        }
        self
    }

    /// Attach an extra value.
    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extras.insert(key.into(), value);
        self
    }

    /// Value reported for an objective.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.objectives
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, value)| value)
    }

    /// Extras reported for the row.
    #[must_use]
    pub const fn extras(&self) -> &Extras {
        &self.extras
    }

    fn into_extras(self) -> Extras {
        self.extras
    }
}

/// Capability interface every simulated experiment implements.
///
/// Implementors provide the domain, the per-row model, their parameters and
/// storage for the history. Rows are always evaluated independently and in
/// order; an implementation may keep internal state (such as a random
/// generator position) across rows, but must not let one row's result feed
/// into another's.
pub trait Experiment {
    /// Stable type name recorded in snapshots.
    fn name(&self) -> &str;

    /// Schema of conditions and results.
    fn domain(&self) -> &Domain;

    /// Evaluate one row of conditions.
    ///
    /// Must report a value for every objective variable of the domain.
    ///
    /// # Errors
    ///
    /// Implementation-specific; any error aborts the whole batch.
    fn evaluate(&mut self, conditions: &ConditionRow) -> Result<Evaluation>;

    /// Parameters contributed to [`to_state`](Self::to_state).
    fn experiment_params(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Log of previous runs.
    fn history(&self) -> &History;

    /// Mutable access to the log of previous runs.
    fn history_mut(&mut self) -> &mut History;

    /// Evaluate a batch of conditions.
    ///
    /// Returns the result table (one row per input row, same order) and one
    /// extras map per row, and appends the pair to the history.
    ///
    /// # Errors
    ///
    /// - [`Error::SchemaMismatch`] if the columns are not exactly the
    ///   domain's decision variables
    /// - [`Error::InvalidColumn`] for non-numeric or null columns, or an
    ///   evaluation that misses an objective
    /// - [`Error::InvalidInput`] for an empty batch or invalid options
    ///
    /// On error nothing is returned and the history is unchanged.
    fn run_experiments(
        &mut self,
        conditions: &RecordBatch,
        options: &RunOptions,
    ) -> Result<(ResultTable, Vec<Extras>)> {
        let span = info_span!(
            "run_experiments",
            experiment = self.name(),
            rows = conditions.num_rows()
        );
        let _guard = span.enter();

        options.validate()?;
        let started_at = Utc::now();
        let columns = ConditionColumns::try_new(self.domain(), conditions)?;
        warn_out_of_bounds(self.domain(), &columns);

        let objective_names: Vec<String> = self
            .domain()
            .objective_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let num_rows = columns.num_rows();
        let mut objectives = vec![Vec::with_capacity(num_rows); objective_names.len()];
        let mut extras = Vec::with_capacity(num_rows);
        let mut experiment_times = Vec::with_capacity(num_rows);

        for row in columns.rows() {
            let start = Instant::now();
            let evaluation = self.evaluate(&row)?;
            experiment_times.push(start.elapsed().as_secs_f64());

            for (values, name) in objectives.iter_mut().zip(&objective_names) {
                let value = evaluation.get(name).ok_or_else(|| Error::InvalidColumn {
                    column: name.clone(),
                    reason: format!("no value reported for row {}", row.index()),
                })?;
                values.push(value);
            }
            trace!(
                row = row.index(),
                objectives = ?evaluation.objectives,
                extras = evaluation.extras().len(),
                "row evaluated"
            );
            extras.push(evaluation.into_extras());
        }

        let ended_at = Utc::now();
        let results = assemble(
            self.domain(),
            &columns,
            objectives,
            RowMetadata {
                computation_time: options.computation_seconds(),
                experiment_times,
                strategy: options.strategy_label(),
            },
        )?;

        let run_id = self.history().next_run_id();
        let record = RunRecord::builder(run_id, conditions.clone(), results.clone())
            .strategy(options.strategy_label())
            .extras(extras.clone())
            .started_at(started_at)
            .ended_at(ended_at)
            .build();
        self.history_mut().push(record);

        info!(run_id, rows = num_rows, strategy = options.strategy_label(), "experiments complete");
        Ok((results, extras))
    }

    /// Snapshot of the domain and parameters.
    fn to_state(&self) -> ExperimentState {
        ExperimentState::new(self.name(), self.domain().clone(), self.experiment_params())
    }

    /// Start a new run by discarding the history.
    fn reset(&mut self) {
        debug!(experiment = self.name(), runs = self.history().len(), "history reset");
        self.history_mut().clear();
    }
}

fn warn_out_of_bounds(domain: &Domain, columns: &ConditionColumns) {
    for (name, column) in columns.names().iter().zip(columns.columns()) {
        let Some(variable) = domain.get(name) else {
            continue;
        };
        for (row, value) in column.values().iter().enumerate() {
            if !variable.contains(*value) {
                warn!(
                    variable = %name,
                    row,
                    value,
                    lower = variable.lower(),
                    upper = variable.upper(),
                    "condition outside declared bounds"
                );
            }
        }
    }
}
