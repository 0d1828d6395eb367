//! Deprotection Sweep Example
//!
//! Evaluates a coarse grid over the deprotection benchmark's domain, prints
//! the best space-time yield found, and dumps a state snapshot.
//!
//! Run with: RUST_LOG=reactor_bench=debug cargo run --example deprotection_sweep

use reactor_bench::benchmarks::deprotection::{CONV, STY};
use reactor_bench::config::BenchmarkConfig;
use reactor_bench::experiment::{Experiment, RunOptions};
use reactor_bench::table::conditions_from_rows;
use tracing_subscriber::EnvFilter;

const STEPS: usize = 5;

#[allow(clippy::cast_precision_loss)]
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Deprotection Benchmark Sweep ===\n");

    // -------------------------------------------------------------------------
    // 1. Build the benchmark from configuration
    // -------------------------------------------------------------------------
    let config = BenchmarkConfig::from_json(r#"{"noise_level": 2.0, "seed": 2024}"#)?;
    let mut bench = config.build()?;
    println!("1. Benchmark with {}% noise (seed {:?})", bench.noise_level(), bench.seed());

    for variable in bench.domain().variables() {
        println!(
            "   {:<5} [{:>6.1}, {:>6.1}] {}{}",
            variable.name(),
            variable.lower(),
            variable.upper(),
            variable.description(),
            if variable.is_objective() { " (objective)" } else { "" }
        );
    }

    // -------------------------------------------------------------------------
    // 2. Full factorial grid
    // -------------------------------------------------------------------------
    let axes: Vec<Vec<f64>> = bench
        .domain()
        .decision_variables()
        .map(|v| {
            (0..STEPS)
                .map(|i| v.lower() + v.span() * i as f64 / (STEPS - 1) as f64)
                .collect()
        })
        .collect();

    let mut rows = Vec::with_capacity(STEPS.pow(3));
    for &tau in &axes[0] {
        for &c_sm in &axes[1] {
            for &t in &axes[2] {
                rows.push([tau, c_sm, t]);
            }
        }
    }

    let conditions = conditions_from_rows(bench.domain(), &rows)?;
    let options = RunOptions::new().strategy("FullFactorial");
    let (results, _) = bench.run_experiments(&conditions, &options)?;
    println!("\n2. Evaluated {} conditions", results.num_rows());

    // -------------------------------------------------------------------------
    // 3. Report the best point
    // -------------------------------------------------------------------------
    let sty = results.values(STY).unwrap_or_default();
    let best = sty
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i);

    if let Some(i) = best {
        println!("\n3. Best space-time yield:");
        for cell in results.row(i) {
            println!("   {:<14} {:<9} {:?}", cell.key.name, cell.key.tag, cell.value);
        }
        println!("   Conv = {:.4}", results.value(i, CONV).unwrap_or(f64::NAN));
    }

    // -------------------------------------------------------------------------
    // 4. Snapshot
    // -------------------------------------------------------------------------
    println!("\n4. State snapshot:");
    println!("{}", serde_json::to_string_pretty(&bench.to_state())?);

    Ok(())
}
