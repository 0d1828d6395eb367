//! Conditions and result tables (Arrow `RecordBatch`)
//!
//! ## Layout
//!
//! ```text
//! conditions:  tau | C_SM | T                        (decision variables)
//! results:     tau | C_SM | T | STY | Conv           tag = DATA
//!              computation_t | experiment_t | strategy   tag = METADATA
//! ```
//!
//! Tags live in Arrow field metadata under [`TAG_KEY`], so a result table is
//! still a plain `RecordBatch` for any Arrow consumer.

mod conditions;
mod results;

pub use conditions::{conditions_from_rows, ConditionColumns, ConditionRow};
pub use results::{
    CellValue, ColumnKey, ResultCell, ResultTable, Tag, COMPUTATION_T, EXPERIMENT_T, STRATEGY,
    TAG_KEY,
};

pub(crate) use results::{assemble, RowMetadata};
