//! # reactor-bench: Simulated Flow-Reactor Experiments
//!
//! **Version**: 0.1.0
//!
//! reactor-bench provides simulated laboratory experiments for scoring
//! black-box optimizers without a real reactor. An optimizer proposes
//! process conditions as an Arrow table; the experiment returns the table
//! extended with (optionally noisy) measured objectives.
//!
//! ## Components
//!
//! - [`domain`]: decision and objective variables with bounds
//! - [`table`]: conditions and tagged result tables
//! - [`experiment`]: the [`Experiment`](experiment::Experiment) protocol,
//!   run history and state snapshots
//! - [`benchmarks`]: concrete models (deprotection in a plug flow reactor)
//! - [`config`]: JSON-loadable construction parameters
//!
//! ## Example Usage
//!
//! ```rust
//! use reactor_bench::benchmarks::DeprotectionBenchmark;
//! use reactor_bench::experiment::{Experiment, RunOptions};
//! use reactor_bench::table::conditions_from_rows;
//!
//! let mut bench = DeprotectionBenchmark::builder().seed(42).build()?;
//! let conditions = conditions_from_rows(
//!     bench.domain(),
//!     &[[5.0, 0.3, 150.0], [25.0, 1.2, 250.0]],
//! )?;
//!
//! let (results, _extras) = bench.run_experiments(&conditions, &RunOptions::new())?;
//! for row in 0..results.num_rows() {
//!     println!(
//!         "STY = {:.4}, Conv = {:.4}",
//!         results.value(row, "STY").unwrap_or(f64::NAN),
//!         results.value(row, "Conv").unwrap_or(f64::NAN),
//!     );
//! }
//! # Ok::<(), reactor_bench::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod benchmarks;
pub mod config;
pub mod domain;
pub mod error;
pub mod experiment;
pub mod table;

pub use error::{Error, Result};
