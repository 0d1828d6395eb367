//! Experiment State - serializable snapshot of an experiment

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::domain::Domain;
use crate::Result;

/// Keys owned by the snapshot itself; experiment parameters may not use them.
pub const RESERVED_KEYS: [&str; 2] = ["name", "domain"];

/// Snapshot sufficient to reconstruct an equivalent experiment.
///
/// The JSON form is flat: `{"name": ..., "domain": [...], <params>...}`.
/// Parameters contributed by a concrete experiment (e.g. `noise_level`)
/// extend the snapshot but can never replace `name` or `domain`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentState {
    name: String,
    domain: Domain,
    #[serde(flatten)]
    params: Map<String, Value>,
}

impl ExperimentState {
    /// Create a snapshot.
    ///
    /// Parameters whose key collides with a base field are dropped with a
    /// warning.
    #[must_use]
    pub fn new(name: impl Into<String>, domain: Domain, params: Map<String, Value>) -> Self {
        let name = name.into();
        let params = params
            .into_iter()
            .filter(|(key, _)| {
                let reserved = RESERVED_KEYS.contains(&key.as_str());
                if reserved {
                    warn!(experiment = %name, key = %key, "dropping parameter that shadows a base field");
                }
                !reserved
            })
            .collect();
        Self {
            name,
            domain,
            params,
        }
    }

    /// Get the experiment type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the domain description.
    #[must_use]
    pub const fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Get the experiment-specific parameters.
    #[must_use]
    pub const fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Get one parameter.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Encode as a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`](crate::Error::Serialization) if a
    /// value cannot be represented in JSON.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Encode as a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`](crate::Error::Serialization) on
    /// encoding failure.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from a JSON string. The domain is re-validated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`](crate::Error::Serialization) if the
    /// JSON is malformed or the domain is invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
