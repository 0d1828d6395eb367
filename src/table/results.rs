//! Result tables - conditions extended with tagged measurements

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};

use super::ConditionColumns;
use crate::domain::Domain;
use crate::{Error, Result};

/// Arrow field metadata key holding a column's [`Tag`].
pub const TAG_KEY: &str = "tag";

/// Optimizer-reported computation time, seconds (nullable).
pub const COMPUTATION_T: &str = "computation_t";
/// Wall time spent evaluating the row, seconds.
pub const EXPERIMENT_T: &str = "experiment_t";
/// Label of the strategy that proposed the row.
pub const STRATEGY: &str = "strategy";

/// Provenance of a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    /// Inputs and measured objective values.
    #[serde(rename = "DATA")]
    Data,
    /// Bookkeeping about how a row was produced.
    #[serde(rename = "METADATA")]
    Metadata,
}

impl Tag {
    /// Canonical string form stored in field metadata.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Data => "DATA",
            Self::Metadata => "METADATA",
        }
    }

    /// Parse the canonical string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DATA" => Some(Self::Data),
            "METADATA" => Some(Self::Metadata),
            _ => None,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Name plus provenance of a result column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnKey {
    /// Column (variable) name.
    pub name: String,
    /// Provenance tag.
    pub tag: Tag,
}

impl ColumnKey {
    /// Create a key.
    #[must_use]
    pub fn new(name: impl Into<String>, tag: Tag) -> Self {
        Self {
            name: name.into(),
            tag,
        }
    }
}

/// Value of a single result cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Numeric value.
    Number(f64),
    /// Text value.
    Text(String),
    /// Missing value.
    Null,
}

/// One cell of a result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultCell {
    /// Which column the cell belongs to.
    pub key: ColumnKey,
    /// Cell content.
    pub value: CellValue,
}

/// Experiment results: the conditions plus one `DATA` column per objective
/// and the `METADATA` bookkeeping columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    batch: RecordBatch,
}

impl ResultTable {
    /// Wrap a record batch whose fields all carry a [`TAG_KEY`] entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidColumn`] if a field is untagged or carries an
    /// unknown tag.
    pub fn try_from_batch(batch: RecordBatch) -> Result<Self> {
        for field in batch.schema().fields() {
            field_tag(field)?;
        }
        Ok(Self { batch })
    }

    /// Underlying record batch.
    #[must_use]
    pub const fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Consume into the underlying record batch.
    #[must_use]
    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }

    /// Schema of the result table.
    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    /// Number of rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Column keys in order.
    #[must_use]
    pub fn keys(&self) -> Vec<ColumnKey> {
        self.batch
            .schema()
            .fields()
            .iter()
            .filter_map(|f| field_tag(f).ok().map(|tag| ColumnKey::new(f.name().clone(), tag)))
            .collect()
    }

    /// Column with the given name and tag.
    #[must_use]
    pub fn column(&self, name: &str, tag: Tag) -> Option<&ArrayRef> {
        let schema = self.batch.schema();
        let (index, field) = schema.column_with_name(name)?;
        if field_tag(field).ok()? != tag {
            return None;
        }
        Some(self.batch.column(index))
    }

    /// All values of a numeric `DATA` column.
    #[must_use]
    pub fn values(&self, name: &str) -> Option<Vec<f64>> {
        let column = self.column(name, Tag::Data)?;
        let array = column.as_any().downcast_ref::<Float64Array>()?;
        Some(array.values().to_vec())
    }

    /// Numeric `DATA` value at `row`.
    #[must_use]
    pub fn value(&self, row: usize, name: &str) -> Option<f64> {
        let column = self.column(name, Tag::Data)?;
        let array = column.as_any().downcast_ref::<Float64Array>()?;
        (row < array.len()).then(|| array.value(row))
    }

    /// Strategy label recorded for `row`.
    #[must_use]
    pub fn strategy(&self, row: usize) -> Option<&str> {
        let column = self.column(STRATEGY, Tag::Metadata)?;
        let array = column.as_any().downcast_ref::<StringArray>()?;
        (row < array.len()).then(|| array.value(row))
    }

    /// Wall time spent evaluating `row`, in seconds.
    #[must_use]
    pub fn experiment_time(&self, row: usize) -> Option<f64> {
        let column = self.column(EXPERIMENT_T, Tag::Metadata)?;
        let array = column.as_any().downcast_ref::<Float64Array>()?;
        (row < array.len()).then(|| array.value(row))
    }

    /// Computation time reported for `row`, if one was supplied.
    #[must_use]
    pub fn computation_time(&self, row: usize) -> Option<f64> {
        let column = self.column(COMPUTATION_T, Tag::Metadata)?;
        let array = column.as_any().downcast_ref::<Float64Array>()?;
        (row < array.len() && !array.is_null(row)).then(|| array.value(row))
    }

    /// All cells of `row` as typed, tagged values.
    ///
    /// Returns an empty vector when `row` is out of range.
    #[must_use]
    pub fn row(&self, row: usize) -> Vec<ResultCell> {
        if row >= self.num_rows() {
            return Vec::new();
        }
        let schema = self.batch.schema();
        schema
            .fields()
            .iter()
            .zip(self.batch.columns())
            .filter_map(|(field, column)| {
                let tag = field_tag(field).ok()?;
                Some(ResultCell {
                    key: ColumnKey::new(field.name().clone(), tag),
                    value: cell_value(column, row),
                })
            })
            .collect()
    }
}

fn field_tag(field: &Field) -> Result<Tag> {
    let raw = field.metadata().get(TAG_KEY).ok_or_else(|| Error::InvalidColumn {
        column: field.name().clone(),
        reason: format!("missing '{TAG_KEY}' metadata"),
    })?;
    Tag::parse(raw).ok_or_else(|| Error::InvalidColumn {
        column: field.name().clone(),
        reason: format!("unknown tag '{raw}'"),
    })
}

fn cell_value(column: &ArrayRef, row: usize) -> CellValue {
    if column.is_null(row) {
        return CellValue::Null;
    }
    if let Some(array) = column.as_any().downcast_ref::<Float64Array>() {
        return CellValue::Number(array.value(row));
    }
    if let Some(array) = column.as_any().downcast_ref::<StringArray>() {
        return CellValue::Text(array.value(row).to_string());
    }
    CellValue::Null
}

fn tagged_field(name: &str, data_type: DataType, nullable: bool, tag: Tag) -> Field {
    Field::new(name, data_type, nullable).with_metadata(HashMap::from([(
        TAG_KEY.to_string(),
        tag.as_str().to_string(),
    )]))
}

/// Per-row bookkeeping attached to a result table.
#[derive(Debug, Clone)]
pub(crate) struct RowMetadata<'a> {
    pub computation_time: Option<f64>,
    pub experiment_times: Vec<f64>,
    pub strategy: &'a str,
}

/// Assemble a result table. `objectives` holds one value vector per
/// objective variable in domain order, each `conditions.num_rows()` long.
pub(crate) fn assemble(
    domain: &Domain,
    conditions: &ConditionColumns,
    objectives: Vec<Vec<f64>>,
    metadata: RowMetadata<'_>,
) -> Result<ResultTable> {
    let num_rows = conditions.num_rows();
    let mut fields = Vec::new();
    let mut arrays: Vec<ArrayRef> = Vec::new();

    for (name, column) in conditions.names().iter().zip(conditions.columns()) {
        fields.push(tagged_field(name, DataType::Float64, false, Tag::Data));
        arrays.push(Arc::new(column.clone()));
    }

    for (variable, values) in domain.objective_variables().zip(objectives) {
        fields.push(tagged_field(variable.name(), DataType::Float64, false, Tag::Data));
        arrays.push(Arc::new(Float64Array::from(values)));
    }

    fields.push(tagged_field(COMPUTATION_T, DataType::Float64, true, Tag::Metadata));
    arrays.push(Arc::new(Float64Array::from(vec![metadata.computation_time; num_rows])));

    fields.push(tagged_field(EXPERIMENT_T, DataType::Float64, false, Tag::Metadata));
    arrays.push(Arc::new(Float64Array::from(metadata.experiment_times)));

    fields.push(tagged_field(STRATEGY, DataType::Utf8, false, Tag::Metadata));
    arrays.push(Arc::new(StringArray::from(vec![metadata.strategy; num_rows])));

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
    Ok(ResultTable { batch })
}
