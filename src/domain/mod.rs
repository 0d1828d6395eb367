//! Domain - the schema of an experiment
//!
//! A [`Domain`] is an ordered, name-unique list of [`Variable`]s. Decision
//! variables define the columns a conditions table must carry; objective
//! variables define the columns an experiment adds to its results.
//!
//! ```rust
//! use reactor_bench::domain::{Domain, Variable};
//!
//! let mut domain = Domain::new();
//! domain.add(Variable::builder("tau", "residence time", (5.0, 25.0)).build()?)?;
//! domain.add(
//!     Variable::builder("Conv", "conversion", (0.0, 1.0))
//!         .objective(true)
//!         .build()?,
//! )?;
//!
//! assert_eq!(domain.decision_names(), vec!["tau"]);
//! assert_eq!(domain.objective_variables().count(), 1);
//! # Ok::<(), reactor_bench::Error>(())
//! ```

mod variable;

pub use variable::{Variable, VariableBuilder};

use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Ordered collection of variables with unique names.
///
/// Domains are built once when an experiment is constructed and treated as
/// read-only afterwards. Nothing enforces that at the type level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Variable>", into = "Vec<Variable>")]
pub struct Domain {
    variables: Vec<Variable>,
}

impl Domain {
    /// Create an empty domain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a domain from variables in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateName`] on the first repeated name.
    pub fn from_variables(variables: impl IntoIterator<Item = Variable>) -> Result<Self> {
        let mut domain = Self::new();
        for variable in variables {
            domain.add(variable)?;
        }
        Ok(domain)
    }

    /// Append a variable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateName`] if a variable with the same name is
    /// already declared. The domain is left unchanged.
    pub fn add(&mut self, variable: Variable) -> Result<()> {
        if self.get(variable.name()).is_some() {
            return Err(Error::DuplicateName(variable.name().to_string()));
        }
        self.variables.push(variable);
        Ok(())
    }

    /// All variables in insertion order.
    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Decision variables in insertion order.
    pub fn decision_variables(&self) -> impl Iterator<Item = &Variable> + '_ {
        self.variables.iter().filter(|v| !v.is_objective())
    }

    /// Objective variables in insertion order.
    pub fn objective_variables(&self) -> impl Iterator<Item = &Variable> + '_ {
        self.variables.iter().filter(|v| v.is_objective())
    }

    /// Names of the decision variables, in order.
    #[must_use]
    pub fn decision_names(&self) -> Vec<&str> {
        self.decision_variables().map(Variable::name).collect()
    }

    /// Names of the objective variables, in order.
    #[must_use]
    pub fn objective_names(&self) -> Vec<&str> {
        self.objective_variables().map(Variable::name).collect()
    }

    /// Look up a variable by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name() == name)
    }

    /// Number of declared variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Check if no variables are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Arrow schema of a conforming conditions table: one non-nullable
    /// `Float64` column per decision variable, in domain order.
    #[must_use]
    pub fn conditions_schema(&self) -> SchemaRef {
        let fields: Vec<Field> = self
            .decision_variables()
            .map(|v| Field::new(v.name(), DataType::Float64, false))
            .collect();
        Arc::new(Schema::new(fields))
    }
}

impl TryFrom<Vec<Variable>> for Domain {
    type Error = Error;

    fn try_from(variables: Vec<Variable>) -> Result<Self> {
        Self::from_variables(variables)
    }
}

impl From<Domain> for Vec<Variable> {
    fn from(domain: Domain) -> Self {
        domain.variables
    }
}
