mod common;

use common::RecordingDiagnostics;

use epochq::args::ArgData;
use epochq::core::{ExecContext, TracingDiagnostics};
use epochq::engine::{format_script, QueueBuilder};
use epochq::error::BuildError;
use epochq::registry::MethodRegistry;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::test]
async fn variables_resolve_and_the_pipeline_runs() {
    let registry = MethodRegistry::with_builtins();
    let mut builder = QueueBuilder::new(&registry);
    let mut pipeline = builder
        .build("sine_source 3 8\ngain $1\nbaseline $2\nnull_sink\n")
        .unwrap();
    pipeline
        .apply_variables(&strings(&["0.5", "divide"]), &TracingDiagnostics)
        .unwrap();
    assert_eq!(
        pipeline.iterated.instances[1].args.get(0).unwrap().data,
        ArgData::Float(0.5)
    );
    assert_eq!(
        pipeline.iterated.instances[2].args.get(0).unwrap().data,
        ArgData::Choice(1)
    );
    let mut ctx = ExecContext::new();
    let summary = pipeline.run(&mut ctx).await.unwrap();
    assert_eq!(summary.accepted, 3);
}

#[test]
fn reprinting_still_shows_the_variable() {
    let registry = MethodRegistry::with_builtins();
    let mut builder = QueueBuilder::new(&registry);
    let mut pipeline = builder
        .build("sine_source 1 8\ngain $1\nnull_sink\n")
        .unwrap();
    pipeline
        .apply_variables(&strings(&["2.0"]), &TracingDiagnostics)
        .unwrap();
    assert!(format_script(&pipeline).contains("gain $1"));
}

#[test]
fn variables_can_be_resolved_again_with_new_values() {
    let registry = MethodRegistry::with_builtins();
    let mut builder = QueueBuilder::new(&registry);
    let mut pipeline = builder
        .build("sine_source 1 8\ngain $1\nnull_sink\n")
        .unwrap();
    pipeline
        .apply_variables(&strings(&["2.0"]), &TracingDiagnostics)
        .unwrap();
    pipeline
        .apply_variables(&strings(&["4.0"]), &TracingDiagnostics)
        .unwrap();
    let gain = pipeline.iterated.instances[1].args.get(0).unwrap();
    assert_eq!(gain.data, ArgData::Float(4.0));
    assert_eq!(gain.variable, Some(1));
}

#[test]
fn referencing_an_unsupplied_variable_is_fatal() {
    let registry = MethodRegistry::with_builtins();
    let mut builder = QueueBuilder::new(&registry);
    let mut pipeline = builder
        .build("sine_source 1 8\ngain $3\nnull_sink\n")
        .unwrap();
    let err = pipeline
        .apply_variables(&strings(&["1.0"]), &TracingDiagnostics)
        .unwrap_err();
    match err {
        BuildError::MissingVariables {
            requested,
            supplied,
        } => {
            assert_eq!(requested, 3);
            assert_eq!(supplied, 1);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn surplus_values_only_rate_a_note() {
    let diag = RecordingDiagnostics::default();
    let registry = MethodRegistry::with_builtins();
    let mut builder = QueueBuilder::new(&registry);
    let mut pipeline = builder
        .build("sine_source 1 8\ngain $1\nnull_sink\n")
        .unwrap();
    pipeline
        .apply_variables(&strings(&["1.0", "unused"]), &diag)
        .unwrap();
    assert!(diag.trace_containing("2 were given"));
}

#[test]
fn unacceptable_variable_value_is_fatal() {
    let registry = MethodRegistry::with_builtins();
    let mut builder = QueueBuilder::new(&registry);
    let mut pipeline = builder
        .build("sine_source 1 8\ngain $1\nnull_sink\n")
        .unwrap();
    let err = pipeline
        .apply_variables(&strings(&["not-a-number"]), &TracingDiagnostics)
        .unwrap_err();
    match err {
        BuildError::VariableBind { value, description } => {
            assert_eq!(value, "not-a-number");
            assert_eq!(description, "gain factor");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn bad_variable_token_is_a_build_error() {
    let registry = MethodRegistry::with_builtins();
    let mut builder = QueueBuilder::new(&registry);
    let err = builder
        .build("sine_source 1 8\ngain $zero\nnull_sink\n")
        .unwrap_err();
    assert!(matches!(err, BuildError::Syntax { .. }));
}
