//! Deprotection reaction in a plug flow reactor
//!
//! First-order kinetics integrated over an ideal plug flow reactor give the
//! outlet concentration in closed form:
//!
//! ```text
//! k(T)  = A * exp(-Ea/R / T)
//! c_out = C_SM * exp(-k(T) * tau)
//! ```
//!
//! The measured outlet concentration carries multiplicative Gaussian noise
//! (standard deviation `noise_level` percent of the signal) and is clamped
//! at zero. Conversion and space-time yield are derived from it.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use serde_json::{json, Map, Value};
use tracing::{debug, trace};

use crate::config::BenchmarkConfig;
use crate::domain::{Domain, Variable};
use crate::experiment::{Evaluation, Experiment, ExperimentState, History};
use crate::table::ConditionRow;
use crate::{Error, Result};

/// Arrhenius pre-exponential factor.
pub const PRE_EXPONENTIAL: f64 = 112.0225;
/// Activation energy over the gas constant.
pub const EA_OVER_R: f64 = 1287.8;
/// Molar mass of the product, g/mol.
pub const PRODUCT_MOLAR_MASS: f64 = 144.172;

/// Residence time column, minutes.
pub const TAU: &str = "tau";
/// Starting material concentration column, mol/L.
pub const C_SM: &str = "C_SM";
/// Reactor temperature column, degrees C.
pub const TEMPERATURE: &str = "T";
/// Space-time yield column, kg/L/hr.
pub const STY: &str = "STY";
/// Conversion column.
pub const CONV: &str = "Conv";

const NAME: &str = "DeprotectionBenchmark";
const NOISE_LEVEL_KEY: &str = "noise_level";
const SEED_KEY: &str = "seed";

/// Rate constant at temperature `t`.
#[must_use]
pub fn rate_constant(t: f64) -> f64 {
    PRE_EXPONENTIAL * (-EA_OVER_R / t).exp()
}

/// Noise-free outlet concentration.
#[must_use]
pub fn outlet_concentration(tau: f64, c_sm: f64, t: f64) -> f64 {
    c_sm * (-rate_constant(t) * tau).exp()
}

/// Conversion and space-time yield for a measured outlet concentration.
///
/// `c_out` is clamped at zero first, so conversion never exceeds one.
/// Returns `(conv, sty)`.
#[must_use]
pub fn objectives(tau: f64, c_sm: f64, c_out: f64) -> (f64, f64) {
    let c_out = c_out.max(0.0);
    let conv = 1.0 - c_out / c_sm;
    let sty = c_sm * conv / tau / 1000.0 * 60.0 * PRODUCT_MOLAR_MASS;
    (conv, sty)
}

/// Benchmark representing a deprotection reaction.
///
/// Residence time, concentration and temperature of a plug flow reactor can
/// be adjusted; space-time yield and conversion are both maximized.
///
/// # Examples
///
/// ```rust
/// use reactor_bench::benchmarks::DeprotectionBenchmark;
/// use reactor_bench::experiment::{Experiment, RunOptions};
/// use reactor_bench::table::conditions_from_rows;
///
/// let mut bench = DeprotectionBenchmark::builder().noise_level(1.0).seed(7).build()?;
///
/// // 10% into every decision range
/// let row: Vec<f64> = bench
///     .domain()
///     .decision_variables()
///     .map(|v| v.lower() + 0.1 * v.span())
///     .collect();
/// let conditions = conditions_from_rows(bench.domain(), &[row])?;
/// let (results, _) = bench.run_experiments(&conditions, &RunOptions::new())?;
/// assert!(results.value(0, "Conv").unwrap() <= 1.0);
/// # Ok::<(), reactor_bench::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct DeprotectionBenchmark {
    domain: Domain,
    noise_level: f64,
    seed: Option<u64>,
    rng: StdRng,
    history: History,
}

impl DeprotectionBenchmark {
    /// Create a benchmark with an entropy-seeded generator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `noise_level` is negative or not
    /// finite.
    pub fn new(noise_level: f64) -> Result<Self> {
        Self::builder().noise_level(noise_level).build()
    }

    /// Create a builder.
    #[must_use]
    pub fn builder() -> DeprotectionBenchmarkBuilder {
        DeprotectionBenchmarkBuilder::default()
    }

    /// Rebuild a benchmark from a snapshot produced by
    /// [`Experiment::to_state`].
    ///
    /// A `seed` parameter in the snapshot is honored; the generator restarts
    /// from that seed.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if the snapshot names another experiment or
    ///   has an invalid `noise_level` or `seed`
    /// - [`Error::SchemaMismatch`] if the snapshot's domain differs from
    ///   this benchmark's domain
    pub fn from_state(state: &ExperimentState) -> Result<Self> {
        if state.name() != NAME {
            return Err(Error::InvalidInput(format!(
                "snapshot describes '{}', expected '{NAME}'",
                state.name()
            )));
        }

        let domain = Self::setup_domain()?;
        if state.domain() != &domain {
            return Err(Error::SchemaMismatch {
                expected: variable_names(&domain),
                found: variable_names(state.domain()),
            });
        }

        let noise_level = match state.param(NOISE_LEVEL_KEY) {
            None => 0.0,
            Some(value) => value.as_f64().ok_or_else(|| {
                Error::InvalidInput(format!("'{NOISE_LEVEL_KEY}' must be a number, got {value}"))
            })?,
        };
        let seed = match state.param(SEED_KEY) {
            None => None,
            Some(value) => Some(value.as_u64().ok_or_else(|| {
                Error::InvalidInput(format!(
                    "'{SEED_KEY}' must be a non-negative integer, got {value}"
                ))
            })?),
        };

        let mut builder = Self::builder().noise_level(noise_level);
        if let Some(seed) = seed {
            builder = builder.seed(seed);
        }
        builder.build()
    }

    /// Noise level, percent of the signal.
    #[must_use]
    pub const fn noise_level(&self) -> f64 {
        self.noise_level
    }

    /// Change the noise level for subsequent evaluations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `noise_level` is negative or not
    /// finite.
    pub fn set_noise_level(&mut self, noise_level: f64) -> Result<()> {
        validate_noise_level(noise_level)?;
        self.noise_level = noise_level;
        Ok(())
    }

    /// Seed the generator was created from, if one was injected.
    #[must_use]
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }

    fn setup_domain() -> Result<Domain> {
        Domain::from_variables([
            Variable::builder(TAU, "residence time in minutes", (5.0, 25.0))
                .units("min")
                .build()?,
            Variable::builder(C_SM, "Concentration of SM in M", (0.3, 1.2))
                .units("mol/L")
                .build()?,
            Variable::builder(TEMPERATURE, "Reactor Temperature in C", (150.0, 250.0))
                .units("degC")
                .build()?,
            Variable::builder(STY, "Space Time Yield in kg/L/hr", (0.0, 100.0))
                .objective(true)
                .units("kg/L/hr")
                .build()?,
            Variable::builder(CONV, "Conversion", (0.0, 1.0))
                .objective(true)
                .build()?,
        ])
    }

    /// Analytic outlet concentration with measurement noise and clamping,
    /// followed by the derived objectives. Returns `(conv, sty)`.
    fn integrate_equations(&mut self, tau: f64, c_sm: f64, t: f64) -> (f64, f64) {
        let mut c_out = outlet_concentration(tau, c_sm, t);

        let sample: f64 = StandardNormal.sample(&mut self.rng);
        c_out += c_out * (sample * self.noise_level) / 100.0;

        let (conv, sty) = objectives(tau, c_sm, c_out);
        trace!(tau, c_sm, t, c_out, conv, sty, "deprotection kinetics");
        (conv, sty)
    }
}

impl Experiment for DeprotectionBenchmark {
    fn name(&self) -> &str {
        NAME
    }

    fn domain(&self) -> &Domain {
        &self.domain
    }

    fn evaluate(&mut self, conditions: &ConditionRow) -> Result<Evaluation> {
        let tau = conditions.require(TAU)?;
        let c_sm = conditions.require(C_SM)?;
        let t = conditions.require(TEMPERATURE)?;

        let (conv, sty) = self.integrate_equations(tau, c_sm, t);
        Ok(Evaluation::new().objective(CONV, conv).objective(STY, sty))
    }

    fn experiment_params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert(NOISE_LEVEL_KEY.to_string(), json!(self.noise_level));
        if let Some(seed) = self.seed {
            params.insert(SEED_KEY.to_string(), json!(seed));
        }
        params
    }

    fn history(&self) -> &History {
        &self.history
    }

    fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }
}

fn validate_noise_level(noise_level: f64) -> Result<()> {
    if noise_level.is_finite() && noise_level >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "noise level must be a finite, non-negative percentage, got {noise_level}"
        )))
    }
}

fn variable_names(domain: &Domain) -> Vec<String> {
    domain
        .variables()
        .iter()
        .map(|v| v.name().to_string())
        .collect()
}

/// Builder for `DeprotectionBenchmark`.
#[derive(Debug, Default)]
pub struct DeprotectionBenchmarkBuilder {
    noise_level: f64,
    seed: Option<u64>,
}

impl DeprotectionBenchmarkBuilder {
    /// Set the noise level, percent of the signal (default 0).
    #[must_use]
    pub const fn noise_level(mut self, noise_level: f64) -> Self {
        self.noise_level = noise_level;
        self
    }

    /// Seed the generator for reproducible noise.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Apply a loaded configuration.
    #[must_use]
    pub fn config(mut self, config: &BenchmarkConfig) -> Self {
        self.noise_level = config.noise_level;
        self.seed = config.seed;
        self
    }

    /// Build the benchmark.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the noise level is negative or not
    /// finite.
    pub fn build(self) -> Result<DeprotectionBenchmark> {
        validate_noise_level(self.noise_level)?;
        let rng = self
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        debug!(noise_level = self.noise_level, seed = ?self.seed, "deprotection benchmark created");

        Ok(DeprotectionBenchmark {
            domain: DeprotectionBenchmark::setup_domain()?,
            noise_level: self.noise_level,
            seed: self.seed,
            rng,
            history: History::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_layout() {
        let bench = DeprotectionBenchmark::new(0.0).unwrap();
        let domain = bench.domain();
        assert_eq!(domain.decision_names(), vec![TAU, C_SM, TEMPERATURE]);
        assert_eq!(domain.objective_names(), vec![STY, CONV]);
        assert!(domain.objective_variables().all(Variable::maximize));
        assert_eq!(domain.get(C_SM).unwrap().bounds(), (0.3, 1.2));
    }

    #[test]
    fn test_rate_constant_literal_formula() {
        let k = rate_constant(250.0);
        assert!((k - 0.648_884_687).abs() < 1e-8);
        let k = rate_constant(150.0);
        assert!((k - 0.020_928_706).abs() < 1e-8);
    }

    #[test]
    fn test_objectives_clamp_negative_concentration() {
        let (conv, sty) = objectives(10.0, 1.0, -0.5);
        assert!((conv - 1.0).abs() < f64::EPSILON);
        assert!(sty > 0.0);
    }

    #[test]
    fn test_negative_noise_rejected() {
        assert!(matches!(
            DeprotectionBenchmark::new(-1.0),
            Err(Error::InvalidInput(_))
        ));
        assert!(DeprotectionBenchmark::new(f64::NAN).is_err());
    }

    #[test]
    fn test_set_noise_level() {
        let mut bench = DeprotectionBenchmark::new(0.0).unwrap();
        bench.set_noise_level(5.0).unwrap();
        assert!((bench.noise_level() - 5.0).abs() < f64::EPSILON);
        assert!(bench.set_noise_level(-0.1).is_err());
        assert!((bench.noise_level() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_noise_matches_analytic_solution() {
        let mut bench = DeprotectionBenchmark::builder().seed(3).build().unwrap();
        let (conv, _) = bench.integrate_equations(15.0, 0.75, 200.0);
        let expected = 1.0 - outlet_concentration(15.0, 0.75, 200.0) / 0.75;
        assert!((conv - expected).abs() < 1e-12);
    }
}
