//! Concrete simulated experiments

pub mod deprotection;

pub use deprotection::{DeprotectionBenchmark, DeprotectionBenchmarkBuilder};
