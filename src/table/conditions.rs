//! Conditions tables - validated experiment inputs

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;

use crate::domain::Domain;
use crate::{Error, Result};

/// One row of proposed conditions, keyed by decision variable name.
///
/// Rows are handed to [`Experiment::evaluate`](crate::experiment::Experiment::evaluate)
/// one at a time; a row never sees another row's values.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionRow {
    index: usize,
    values: Vec<(String, f64)>,
}

impl ConditionRow {
    /// Position of this row in the submitted batch.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Value of a decision variable, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(column, _)| column == name)
            .map(|&(_, value)| value)
    }

    /// Value of a decision variable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidColumn`] if the row has no such column.
    pub fn require(&self, name: &str) -> Result<f64> {
        self.get(name).ok_or_else(|| Error::InvalidColumn {
            column: name.to_string(),
            reason: "not present in condition row".to_string(),
        })
    }

    /// Iterate `(name, value)` pairs in domain order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

/// A conditions batch checked against a domain.
///
/// Columns are reordered into domain order and cast to `Float64`.
#[derive(Debug, Clone)]
pub struct ConditionColumns {
    names: Vec<String>,
    columns: Vec<Float64Array>,
    num_rows: usize,
}

impl ConditionColumns {
    /// Validate `batch` against the decision variables of `domain`.
    ///
    /// # Errors
    ///
    /// - [`Error::SchemaMismatch`] if the column names are not exactly the
    ///   decision variable names (missing, extra or duplicated columns)
    /// - [`Error::InvalidColumn`] if a column is non-numeric or has nulls
    /// - [`Error::InvalidInput`] if the batch has no rows
    pub fn try_new(domain: &Domain, batch: &RecordBatch) -> Result<Self> {
        let schema = batch.schema();
        let mut expected: Vec<String> = domain
            .decision_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let mut found: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();

        let mut expected_sorted = expected.clone();
        let mut found_sorted = found.clone();
        expected_sorted.sort();
        found_sorted.sort();
        if expected_sorted != found_sorted {
            expected.sort_unstable();
            found.sort_unstable();
            return Err(Error::SchemaMismatch { expected, found });
        }

        if batch.num_rows() == 0 {
            return Err(Error::InvalidInput(
                "conditions table must contain at least one row".to_string(),
            ));
        }

        let mut columns = Vec::with_capacity(expected.len());
        for name in &expected {
            let column = batch.column_by_name(name).ok_or_else(|| Error::InvalidColumn {
                column: name.clone(),
                reason: "missing from batch".to_string(),
            })?;
            columns.push(to_float64(name, column)?);
        }

        Ok(Self {
            names: expected,
            columns,
            num_rows: batch.num_rows(),
        })
    }

    /// Number of rows.
    #[must_use]
    pub const fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Decision variable names in domain order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Validated `Float64` columns in domain order.
    #[must_use]
    pub fn columns(&self) -> &[Float64Array] {
        &self.columns
    }

    /// Extract row `index` as a [`ConditionRow`].
    ///
    /// # Panics
    ///
    /// Panics if `index >= num_rows()`.
    #[must_use]
    pub fn row(&self, index: usize) -> ConditionRow {
        let values = self
            .names
            .iter()
            .zip(&self.columns)
            .map(|(name, column)| (name.clone(), column.value(index)))
            .collect();
        ConditionRow { index, values }
    }

    /// Iterate over all rows in order.
    pub fn rows(&self) -> impl Iterator<Item = ConditionRow> + '_ {
        (0..self.num_rows).map(|i| self.row(i))
    }
}

fn to_float64(name: &str, column: &ArrayRef) -> Result<Float64Array> {
    if !column.data_type().is_numeric() {
        return Err(Error::InvalidColumn {
            column: name.to_string(),
            reason: format!("expected a numeric column, got {}", column.data_type()),
        });
    }
    if column.null_count() > 0 {
        return Err(Error::InvalidColumn {
            column: name.to_string(),
            reason: format!("{} null value(s)", column.null_count()),
        });
    }

    let cast_column = cast(column, &DataType::Float64)?;
    cast_column
        .as_any()
        .downcast_ref::<Float64Array>()
        .cloned()
        .ok_or_else(|| Error::InvalidColumn {
            column: name.to_string(),
            reason: "failed to downcast to Float64Array".to_string(),
        })
}

/// Build a conditions table from row-major values.
///
/// Each inner slice holds one value per decision variable, in domain order.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if a row has the wrong length.
///
/// # Examples
///
/// ```rust
/// use reactor_bench::benchmarks::DeprotectionBenchmark;
/// use reactor_bench::experiment::Experiment;
/// use reactor_bench::table::conditions_from_rows;
///
/// let bench = DeprotectionBenchmark::new(0.0)?;
/// let batch = conditions_from_rows(bench.domain(), &[[15.0, 0.75, 200.0]])?;
/// assert_eq!(batch.num_rows(), 1);
/// # Ok::<(), reactor_bench::Error>(())
/// ```
pub fn conditions_from_rows<R: AsRef<[f64]>>(domain: &Domain, rows: &[R]) -> Result<RecordBatch> {
    let schema = domain.conditions_schema();
    let width = schema.fields().len();

    let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(rows.len()); width];
    for (i, row) in rows.iter().enumerate() {
        let row = row.as_ref();
        if row.len() != width {
            return Err(Error::InvalidInput(format!(
                "row {i} has {} values, domain declares {width} decision variables",
                row.len()
            )));
        }
        for (column, value) in columns.iter_mut().zip(row) {
            column.push(*value);
        }
    }

    let arrays: Vec<ArrayRef> = columns
        .into_iter()
        .map(|values| Arc::new(Float64Array::from(values)) as ArrayRef)
        .collect();
    Ok(RecordBatch::try_new(schema, arrays)?)
}
