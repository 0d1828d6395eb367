//! Error types for reactor-bench
//!
//! Every error surfaces synchronously to the caller. Nothing here is
//! transient, so there is no retry classification.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// reactor-bench error types
#[derive(Error, Debug)]
pub enum Error {
    /// Two variables with the same name were registered in one domain
    #[error("Duplicate variable name: '{0}'\nVariable names must be unique within a domain")]
    DuplicateName(String),

    /// Conditions table columns do not match the domain's decision variables
    #[error("Schema mismatch: expected columns {expected:?}, got {found:?}")]
    SchemaMismatch {
        /// Decision variable names declared by the domain
        expected: Vec<String>,
        /// Column names found in the supplied table
        found: Vec<String>,
    },

    /// A column exists but cannot be used as numeric experiment data
    #[error("Invalid column '{column}': {reason}")]
    InvalidColumn {
        /// Offending column name
        column: String,
        /// What is wrong with it
        reason: String,
    },

    /// Invalid argument (bad bounds, negative noise, empty batch, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON state encoding/decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

impl Error {
    /// Returns true for errors caused by a conditions table that does not
    /// conform to the experiment's domain.
    #[must_use]
    pub const fn is_schema_error(&self) -> bool {
        matches!(self, Self::SchemaMismatch { .. } | Self::InvalidColumn { .. })
    }
}
