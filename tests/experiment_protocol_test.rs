//! Experiment protocol tests
//!
//! Exercises the provided `run_experiments` machinery through a toy
//! experiment whose model is trivial: `y = a + b`, with the row index as an
//! extra.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use reactor_bench::domain::{Domain, Variable};
use reactor_bench::experiment::{Evaluation, Experiment, History, RunOptions};
use reactor_bench::table::{conditions_from_rows, CellValue, ConditionRow, Tag, COMPUTATION_T};
use reactor_bench::{Error, Result};
use serde_json::{json, Map, Value};

struct Adder {
    domain: Domain,
    history: History,
    fail_on: Option<usize>,
    skip_objective: bool,
}

impl Adder {
    fn new() -> Self {
        let domain = Domain::from_variables([
            Variable::builder("a", "first addend", (0.0, 10.0)).build().unwrap(),
            Variable::builder("b", "second addend", (0.0, 10.0)).build().unwrap(),
            Variable::builder("y", "sum", (0.0, 20.0))
                .objective(false)
                .build()
                .unwrap(),
        ])
        .unwrap();
        Self {
            domain,
            history: History::new(),
            fail_on: None,
            skip_objective: false,
        }
    }
}

impl Experiment for Adder {
    fn name(&self) -> &str {
        "Adder"
    }

    fn domain(&self) -> &Domain {
        &self.domain
    }

    fn evaluate(&mut self, conditions: &ConditionRow) -> Result<Evaluation> {
        if self.fail_on == Some(conditions.index()) {
            return Err(Error::InvalidInput("instrument fault".to_string()));
        }
        let evaluation = Evaluation::new().extra("row", json!(conditions.index()));
        if self.skip_objective {
            return Ok(evaluation);
        }
        let y = conditions.iter().map(|(_, value)| value).sum::<f64>();
        Ok(evaluation.objective("y", y))
    }

    fn experiment_params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("offset".to_string(), json!(0));
        params.insert("domain".to_string(), json!("shadowed"));
        params
    }

    fn history(&self) -> &History {
        &self.history
    }

    fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }
}

fn batch(columns: Vec<(&str, ArrayRef)>) -> RecordBatch {
    let fields: Vec<Field> = columns
        .iter()
        .map(|(name, array)| Field::new(*name, array.data_type().clone(), false))
        .collect();
    let arrays = columns.into_iter().map(|(_, array)| array).collect();
    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).unwrap()
}

fn floats(values: &[f64]) -> ArrayRef {
    Arc::new(Float64Array::from(values.to_vec()))
}

// =============================================================================
// Happy path
// =============================================================================

#[test]
fn test_rows_evaluated_in_order() {
    let mut exp = Adder::new();
    let conditions = conditions_from_rows(exp.domain(), &[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]])
        .unwrap();

    let (results, extras) = exp.run_experiments(&conditions, &RunOptions::new()).unwrap();

    assert_eq!(results.num_rows(), 3);
    assert_eq!(results.values("y").unwrap(), vec![3.0, 7.0, 11.0]);
    let rows: Vec<Value> = extras.iter().map(|e| e["row"].clone()).collect();
    assert_eq!(rows, vec![json!(0), json!(1), json!(2)]);
}

#[test]
fn test_column_order_is_free() {
    let mut exp = Adder::new();
    let conditions = batch(vec![
        ("b", floats(&[2.0])),
        ("a", Arc::new(Int64Array::from(vec![1]))),
    ]);

    let (results, _) = exp.run_experiments(&conditions, &RunOptions::new()).unwrap();
    let names: Vec<String> = results.keys().into_iter().map(|k| k.name).collect();
    assert_eq!(names[..3], ["a", "b", "y"]);
    assert_eq!(results.value(0, "y"), Some(3.0));
}

#[test]
fn test_metadata_columns() {
    let mut exp = Adder::new();
    let conditions = conditions_from_rows(exp.domain(), &[[1.0, 1.0]]).unwrap();
    let options = RunOptions::new().strategy("TSEMO").computation_time(1.25);

    let (results, _) = exp.run_experiments(&conditions, &options).unwrap();

    assert_eq!(results.strategy(0), Some("TSEMO"));
    assert_eq!(results.computation_time(0), Some(1.25));
    assert!(results.column(COMPUTATION_T, Tag::Metadata).is_some());
    assert!(results.column(COMPUTATION_T, Tag::Data).is_none());

    let cells = results.row(0);
    let strategy = cells.iter().find(|c| c.key.name == "strategy").unwrap();
    assert_eq!(strategy.key.tag, Tag::Metadata);
    assert_eq!(strategy.value, CellValue::Text("TSEMO".to_string()));
}

#[test]
fn test_history_records_request_and_response() {
    let mut exp = Adder::new();
    let first = conditions_from_rows(exp.domain(), &[[1.0, 1.0]]).unwrap();
    let second = conditions_from_rows(exp.domain(), &[[2.0, 2.0], [3.0, 3.0]]).unwrap();

    exp.run_experiments(&first, &RunOptions::new().strategy("s1")).unwrap();
    let (results, _) = exp.run_experiments(&second, &RunOptions::new().strategy("s2")).unwrap();

    let history = exp.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history.records()[0].run_id(), 0);
    assert_eq!(history.records()[0].strategy(), "s1");

    let latest = history.latest().unwrap();
    assert_eq!(latest.run_id(), 1);
    assert_eq!(latest.conditions(), &second);
    assert_eq!(latest.results(), &results);
    assert_eq!(latest.extras().len(), 2);
    assert!(latest.ended_at() >= latest.started_at());
    assert!(history.get(1).is_some());
}

#[test]
fn test_evaluation_accumulates_objectives_and_extras() {
    let evaluation = Evaluation::new()
        .objective("y", 1.0)
        .objective("y", 2.0)
        .extra("note", json!("retry"));

    assert_eq!(evaluation.get("y"), Some(2.0));
    assert_eq!(evaluation.get("z"), None);
    assert_eq!(evaluation.extras().len(), 1);
    assert_eq!(evaluation.extras()["note"], json!("retry"));
}

#[test]
fn test_out_of_bounds_conditions_are_evaluated() {
    let mut exp = Adder::new();
    let conditions = conditions_from_rows(exp.domain(), &[[50.0, -1.0]]).unwrap();

    let (results, _) = exp.run_experiments(&conditions, &RunOptions::new()).unwrap();
    assert_eq!(results.value(0, "y"), Some(49.0));
}

// =============================================================================
// Schema enforcement and failure atomicity
// =============================================================================

#[test]
fn test_missing_column_is_schema_mismatch() {
    let mut exp = Adder::new();
    let conditions = batch(vec![("a", floats(&[1.0]))]);

    let err = exp.run_experiments(&conditions, &RunOptions::new()).unwrap_err();
    match err {
        Error::SchemaMismatch { expected, found } => {
            assert_eq!(expected, vec!["a", "b"]);
            assert_eq!(found, vec!["a"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(exp.history().is_empty());
}

#[test]
fn test_extra_column_is_schema_mismatch() {
    let mut exp = Adder::new();
    let conditions = batch(vec![
        ("a", floats(&[1.0])),
        ("b", floats(&[1.0])),
        ("y", floats(&[2.0])),
    ]);

    let err = exp.run_experiments(&conditions, &RunOptions::new()).unwrap_err();
    assert!(matches!(err, Error::SchemaMismatch { .. }));
    assert!(exp.history().is_empty());
}

#[test]
fn test_empty_batch_rejected() {
    let mut exp = Adder::new();
    let conditions = conditions_from_rows::<[f64; 2]>(exp.domain(), &[]).unwrap();

    let err = exp.run_experiments(&conditions, &RunOptions::new()).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[test]
fn test_row_failure_returns_nothing() {
    let mut exp = Adder::new();
    exp.fail_on = Some(1);
    let conditions = conditions_from_rows(exp.domain(), &[[1.0, 1.0], [2.0, 2.0]]).unwrap();

    assert!(exp.run_experiments(&conditions, &RunOptions::new()).is_err());
    assert!(exp.history().is_empty());
}

#[test]
fn test_missing_objective_is_reported() {
    let mut exp = Adder::new();
    exp.skip_objective = true;
    let conditions = conditions_from_rows(exp.domain(), &[[1.0, 1.0]]).unwrap();

    let err = exp.run_experiments(&conditions, &RunOptions::new()).unwrap_err();
    assert!(matches!(err, Error::InvalidColumn { ref column, .. } if column == "y"));
}

// =============================================================================
// Snapshots and reset
// =============================================================================

#[test]
fn test_state_params_extend_but_do_not_shadow() {
    let exp = Adder::new();
    let state = exp.to_state();

    assert_eq!(state.name(), "Adder");
    assert_eq!(state.domain(), exp.domain());
    assert_eq!(state.param("offset"), Some(&json!(0)));
    assert!(state.param("domain").is_none());

    let value = state.to_value().unwrap();
    assert!(value["domain"].is_array());
}

#[test]
fn test_reset_clears_history() {
    let mut exp = Adder::new();
    let conditions = conditions_from_rows(exp.domain(), &[[1.0, 1.0]]).unwrap();
    exp.run_experiments(&conditions, &RunOptions::new()).unwrap();
    assert_eq!(exp.history().len(), 1);

    exp.reset();
    assert!(exp.history().is_empty());

    exp.run_experiments(&conditions, &RunOptions::new()).unwrap();
    assert_eq!(exp.history().latest().unwrap().run_id(), 0);
}

#[test]
fn test_schema_of_conditions_helper() {
    let exp = Adder::new();
    let schema = exp.domain().conditions_schema();
    assert_eq!(schema.fields().len(), 2);
    assert!(schema.fields().iter().all(|f| f.data_type() == &DataType::Float64));
}
