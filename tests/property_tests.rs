//! Property-based tests for reactor-bench
//!
//! - Test physical invariants of the kinetic model
//! - Test schema and ordering guarantees of the experiment protocol
//! - Run with ProptestConfig::with_cases(100)

use proptest::prelude::*;
use reactor_bench::benchmarks::deprotection::{objectives, outlet_concentration, CONV, STY};
use reactor_bench::benchmarks::DeprotectionBenchmark;
use reactor_bench::experiment::{Experiment, RunOptions};
use reactor_bench::table::conditions_from_rows;

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// Generate conditions inside the declared domain bounds
fn arb_conditions() -> impl Strategy<Value = [f64; 3]> {
    (5.0f64..=25.0, 0.3f64..=1.2, 150.0f64..=250.0).prop_map(|(tau, c, t)| [tau, c, t])
}

fn evaluate(bench: &mut DeprotectionBenchmark, rows: &[[f64; 3]]) -> (Vec<f64>, Vec<f64>) {
    let conditions = conditions_from_rows(bench.domain(), rows).unwrap();
    let (results, _) = bench.run_experiments(&conditions, &RunOptions::new()).unwrap();
    (results.values(CONV).unwrap(), results.values(STY).unwrap())
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: without noise, conversion is in [0, 1) and STY is non-negative
    #[test]
    fn prop_noise_free_objectives_in_range(row in arb_conditions()) {
        let mut bench = DeprotectionBenchmark::new(0.0).unwrap();
        let (conv, sty) = evaluate(&mut bench, &[row]);

        prop_assert!(conv[0] >= 0.0);
        prop_assert!(conv[0] < 1.0);
        prop_assert!(sty[0] >= 0.0);
    }

    /// Property: conversion never decreases with longer residence time
    #[test]
    fn prop_conversion_monotonic_in_tau(
        row in arb_conditions(),
        extra in 0.0f64..=20.0,
    ) {
        let [tau, c, t] = row;
        let longer = (tau + extra).min(25.0);
        let mut bench = DeprotectionBenchmark::new(0.0).unwrap();
        let (conv, _) = evaluate(&mut bench, &[[tau, c, t], [longer, c, t]]);

        prop_assert!(conv[1] >= conv[0], "conv({longer}) = {} < conv({tau}) = {}", conv[1], conv[0]);
    }

    /// Property: conversion never exceeds one, whatever the noise
    #[test]
    fn prop_conversion_bounded_under_noise(
        row in arb_conditions(),
        noise in 0.0f64..1000.0,
        seed in any::<u64>(),
    ) {
        let mut bench = DeprotectionBenchmark::builder()
            .noise_level(noise)
            .seed(seed)
            .build()
            .unwrap();
        let (conv, sty) = evaluate(&mut bench, &[row; 4]);

        for (c, s) in conv.iter().zip(&sty) {
            prop_assert!(*c <= 1.0);
            prop_assert!(c.is_finite());
            prop_assert!(s.is_finite());
        }
    }

    /// Property: clamping makes any negative measurement read as full conversion
    #[test]
    fn prop_negative_outlet_is_full_conversion(
        row in arb_conditions(),
        c_out in -10.0f64..0.0,
    ) {
        let [tau, c, _] = row;
        let (conv, _) = objectives(tau, c, c_out);
        prop_assert_eq!(conv, 1.0);
    }

    /// Property: zero noise reproduces the analytic solution bit for bit
    #[test]
    fn prop_zero_noise_matches_closed_form(row in arb_conditions(), seed in any::<u64>()) {
        let [tau, c, t] = row;
        let mut bench = DeprotectionBenchmark::builder().seed(seed).build().unwrap();
        let (conv, sty) = evaluate(&mut bench, &[row]);

        let (expected_conv, expected_sty) = objectives(tau, c, outlet_concentration(tau, c, t));
        prop_assert_eq!(conv[0].to_bits(), expected_conv.to_bits());
        prop_assert_eq!(sty[0].to_bits(), expected_sty.to_bits());
    }

    /// Property: output row i corresponds to input row i
    #[test]
    fn prop_row_order_preserved(rows in proptest::collection::vec(arb_conditions(), 1..20)) {
        let mut bench = DeprotectionBenchmark::new(0.0).unwrap();
        let conditions = conditions_from_rows(bench.domain(), &rows).unwrap();
        let (results, extras) = bench.run_experiments(&conditions, &RunOptions::new()).unwrap();

        prop_assert_eq!(results.num_rows(), rows.len());
        prop_assert_eq!(extras.len(), rows.len());
        let taus = results.values("tau").unwrap();
        for (tau, row) in taus.iter().zip(&rows) {
            prop_assert_eq!(*tau, row[0]);
        }
    }
}
