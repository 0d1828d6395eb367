//! Variable - one named decision or objective quantity

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A continuous quantity declared in a [`Domain`](super::Domain).
///
/// Decision variables are the knobs an optimizer may turn; objective
/// variables are what the experiment measures. Variables are immutable once
/// built: bounds are validated in [`VariableBuilder::build`] and again on
/// deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "VariableRecord")]
pub struct Variable {
    name: String,
    description: String,
    bounds: (f64, f64),
    is_objective: bool,
    maximize: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    units: Option<String>,
}

impl Variable {
    /// Create a builder for a continuous variable.
    ///
    /// # Arguments
    ///
    /// * `name` - Column name, unique within a domain
    /// * `description` - Human-readable description
    /// * `bounds` - Inclusive `(lower, upper)` range, `lower < upper`
    #[must_use]
    pub fn builder(
        name: impl Into<String>,
        description: impl Into<String>,
        bounds: (f64, f64),
    ) -> VariableBuilder {
        VariableBuilder::new(name, description, bounds)
    }

    /// Get the variable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Get the inclusive `(lower, upper)` bounds.
    #[must_use]
    pub const fn bounds(&self) -> (f64, f64) {
        self.bounds
    }

    /// Lower bound.
    #[must_use]
    pub const fn lower(&self) -> f64 {
        self.bounds.0
    }

    /// Upper bound.
    #[must_use]
    pub const fn upper(&self) -> f64 {
        self.bounds.1
    }

    /// Whether this variable is an objective (measured output).
    #[must_use]
    pub const fn is_objective(&self) -> bool {
        self.is_objective
    }

    /// Whether the objective should be maximized.
    ///
    /// Only meaningful when [`is_objective`](Self::is_objective) is true.
    #[must_use]
    pub const fn maximize(&self) -> bool {
        self.maximize
    }

    /// Units label, if any.
    #[must_use]
    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    /// Check whether `value` lies within the inclusive bounds.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.bounds.0 && value <= self.bounds.1
    }

    /// Width of the bounded range.
    #[must_use]
    pub fn span(&self) -> f64 {
        self.bounds.1 - self.bounds.0
    }
}

fn validate_bounds(name: &str, (lower, upper): (f64, f64)) -> Result<()> {
    if !lower.is_finite() || !upper.is_finite() {
        return Err(Error::InvalidInput(format!(
            "bounds of '{name}' must be finite, got ({lower}, {upper})"
        )));
    }
    if lower >= upper {
        return Err(Error::InvalidInput(format!(
            "lower bound of '{name}' must be below upper bound, got ({lower}, {upper})"
        )));
    }
    Ok(())
}

/// Builder for `Variable`.
#[derive(Debug)]
pub struct VariableBuilder {
    name: String,
    description: String,
    bounds: (f64, f64),
    is_objective: bool,
    maximize: bool,
    units: Option<String>,
}

impl VariableBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, bounds: (f64, f64)) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            bounds,
            is_objective: false,
            maximize: false,
            units: None,
        }
    }

    /// Mark the variable as an objective, maximized when `maximize` is true
    /// and minimized otherwise.
    #[must_use]
    pub const fn objective(mut self, maximize: bool) -> Self {
        self.is_objective = true;
        self.maximize = maximize;
        self
    }

    /// Set a units label.
    #[must_use]
    pub fn units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Build the `Variable`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the name is empty, or the bounds
    /// are not finite or not strictly increasing.
    pub fn build(self) -> Result<Variable> {
        if self.name.is_empty() {
            return Err(Error::InvalidInput("variable name must not be empty".to_string()));
        }
        validate_bounds(&self.name, self.bounds)?;
        Ok(Variable {
            name: self.name,
            description: self.description,
            bounds: self.bounds,
            is_objective: self.is_objective,
            maximize: self.is_objective && self.maximize,
            units: self.units,
        })
    }
}

/// Unvalidated wire form of a [`Variable`].
#[derive(Deserialize)]
struct VariableRecord {
    name: String,
    #[serde(default)]
    description: String,
    bounds: (f64, f64),
    #[serde(default)]
    is_objective: bool,
    #[serde(default)]
    maximize: bool,
    #[serde(default)]
    units: Option<String>,
}

impl TryFrom<VariableRecord> for Variable {
    type Error = Error;

    fn try_from(record: VariableRecord) -> Result<Self> {
        let mut builder = VariableBuilder::new(record.name, record.description, record.bounds);
        if record.is_objective {
            builder = builder.objective(record.maximize);
        }
        if let Some(units) = record.units {
            builder = builder.units(units);
        }
        builder.build()
    }
}
