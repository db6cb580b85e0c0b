mod common;

use common::RecordingDiagnostics;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use epochq::args::ArgValues;
use epochq::core::{Epoch, ExecContext, Method, MethodKind};
use epochq::engine::QueueBuilder;
use epochq::registry::{MethodDescriptor, MethodRegistry};

#[tokio::test]
async fn epochs_flow_from_source_to_collect() {
    let registry = MethodRegistry::with_builtins();
    let mut builder = QueueBuilder::new(&registry);
    let mut pipeline = builder.build("sine_source 4 16\naverage\n").unwrap();
    let mut ctx = ExecContext::new();
    let summary = pipeline.run(&mut ctx).await.unwrap();
    assert_eq!(summary.accepted, 4);
    assert_eq!(summary.rejected, 0);
    let result = summary.result.expect("average should emit at finalize");
    assert_eq!(result.nr_of_channels(), 1);
    assert_eq!(result.nr_of_points(), 16);
    assert_eq!(result.metadata.get("averages").map(String::as_str), Some("4"));
}

#[tokio::test]
async fn rejected_epochs_are_counted_not_fatal() {
    let registry = MethodRegistry::with_builtins();
    let mut builder = QueueBuilder::new(&registry);
    // threshold 0 throws away every epoch with any nonzero sample
    let mut pipeline = builder
        .build("sine_source 5 8\nreject_level 0.0\naverage\n")
        .unwrap();
    let mut ctx = ExecContext::new();
    let summary = pipeline.run(&mut ctx).await.unwrap();
    assert_eq!(summary.accepted, 0);
    assert_eq!(summary.rejected, 5);
    assert!(summary.result.is_none());
}

#[tokio::test]
async fn branch_alternates_are_drained_in_order() {
    let registry = MethodRegistry::with_builtins();
    let mut builder = QueueBuilder::new(&registry);
    let mut pipeline = builder
        .build("sine_source 2 8\n>sine_source 3 8\nnull_sink\n")
        .unwrap();
    let mut ctx = ExecContext::new();
    let summary = pipeline.run(&mut ctx).await.unwrap();
    assert_eq!(summary.accepted, 5);
    assert_eq!(pipeline.iterated.current_source, pipeline.iterated.source_region);
}

#[tokio::test]
async fn empty_source_falls_through_to_its_alternate() {
    let registry = MethodRegistry::with_builtins();
    let mut builder = QueueBuilder::new(&registry);
    let mut pipeline = builder
        .build("sine_source 0 8\n>sine_source 2 8\nnull_sink\n")
        .unwrap();
    let mut ctx = ExecContext::new();
    let summary = pipeline.run(&mut ctx).await.unwrap();
    assert_eq!(summary.accepted, 2);
}

#[tokio::test]
async fn stop_request_ends_iteration_early() {
    let registry = MethodRegistry::with_builtins();
    let mut builder = QueueBuilder::new(&registry);
    let mut pipeline = builder
        .build("sine_source 100 8\nreject_level -s 3 10.0\nnull_sink\n")
        .unwrap();
    let mut ctx = ExecContext::new();
    let summary = pipeline.run(&mut ctx).await.unwrap();
    assert_eq!(summary.accepted, 3);
    assert!(ctx.stop_requested);
}

#[tokio::test]
async fn overridden_transform_with_no_data_ends_immediately() {
    let registry = MethodRegistry::with_builtins();
    let mut builder = QueueBuilder::new(&registry);
    let mut pipeline = builder.build("!gain 2.0\nnull_sink\n").unwrap();
    let mut ctx = ExecContext::new();
    let summary = pipeline.run(&mut ctx).await.unwrap();
    assert_eq!(summary.accepted, 0);
    assert!(summary.result.is_none());
}

#[tokio::test]
async fn post_queue_processes_the_end_result() {
    let registry = MethodRegistry::with_builtins();
    let mut builder = QueueBuilder::new(&registry);
    let mut pipeline = builder
        .build("sine_source 2 8\naverage\nPost:\ngain 2.0\n")
        .unwrap();
    let mut ctx = ExecContext::new();
    let summary = pipeline.run(&mut ctx).await.unwrap();
    let result = summary.result.expect("post queue should pass the result on");
    assert_eq!(result.metadata.get("averages").map(String::as_str), Some("2"));
    assert_eq!(result.nr_of_points(), 8);
}

#[tokio::test]
async fn missing_post_queue_is_noted() {
    let diag = Arc::new(RecordingDiagnostics::default());
    let registry = MethodRegistry::with_builtins();
    let mut builder = QueueBuilder::new(&registry);
    let mut pipeline = builder.build("sine_source 1 8\naverage\n").unwrap();
    let mut ctx = ExecContext::with_diagnostics(diag.clone());
    let summary = pipeline.run(&mut ctx).await.unwrap();
    assert!(summary.result.is_some());
    assert!(diag.trace_containing("no Post: queue"));
}

static EXPLODE_FINALIZED: AtomicBool = AtomicBool::new(false);

struct Explode;

#[async_trait]
impl Method for Explode {
    async fn init(&mut self, _ctx: &mut ExecContext, _args: &ArgValues) -> Result<()> {
        EXPLODE_FINALIZED.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn execute(
        &mut self,
        _ctx: &mut ExecContext,
        _input: Option<Epoch>,
    ) -> Result<Option<Epoch>> {
        Err(anyhow!("deliberate runtime failure"))
    }

    async fn finalize(
        &mut self,
        _ctx: &mut ExecContext,
        _result: Option<Epoch>,
    ) -> Result<Option<Epoch>> {
        EXPLODE_FINALIZED.store(true, Ordering::SeqCst);
        Ok(None)
    }
}

fn explode_descriptor() -> MethodDescriptor {
    MethodDescriptor::new("explode", MethodKind::Transform, "always fails")
        .with_factory(|| Box::new(Explode))
}

#[tokio::test]
async fn fatal_error_still_runs_finalizers() {
    let mut registry = MethodRegistry::with_builtins();
    registry.register(explode_descriptor());
    let mut builder = QueueBuilder::new(&registry);
    let mut pipeline = builder
        .build("sine_source 5 8\nexplode\nnull_sink\n")
        .unwrap();
    let mut ctx = ExecContext::new();
    let err = pipeline.run(&mut ctx).await.unwrap_err();
    assert!(err.to_string().contains("deliberate runtime failure"));
    assert_eq!(ctx.accepted_epochs, 0);
    assert!(EXPLODE_FINALIZED.load(Ordering::SeqCst));
}

/// Transform whose finalizer always fails; execute passes data through.
struct Grumble;

#[async_trait]
impl Method for Grumble {
    async fn execute(
        &mut self,
        _ctx: &mut ExecContext,
        input: Option<Epoch>,
    ) -> Result<Option<Epoch>> {
        Ok(input)
    }

    async fn finalize(
        &mut self,
        _ctx: &mut ExecContext,
        _result: Option<Epoch>,
    ) -> Result<Option<Epoch>> {
        Err(anyhow!("finalizer breakdown"))
    }
}

fn grumble_descriptor() -> MethodDescriptor {
    MethodDescriptor::new("grumble", MethodKind::Transform, "fails at finalize")
        .with_factory(|| Box::new(Grumble))
}

static LATE_FINALIZED: AtomicBool = AtomicBool::new(false);

/// Transform that fails every execute and notes when its finalizer ran.
struct Crash;

#[async_trait]
impl Method for Crash {
    async fn init(&mut self, _ctx: &mut ExecContext, _args: &ArgValues) -> Result<()> {
        LATE_FINALIZED.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn execute(
        &mut self,
        _ctx: &mut ExecContext,
        _input: Option<Epoch>,
    ) -> Result<Option<Epoch>> {
        Err(anyhow!("mid-run failure"))
    }

    async fn finalize(
        &mut self,
        _ctx: &mut ExecContext,
        _result: Option<Epoch>,
    ) -> Result<Option<Epoch>> {
        LATE_FINALIZED.store(true, Ordering::SeqCst);
        Ok(None)
    }
}

fn crash_descriptor() -> MethodDescriptor {
    MethodDescriptor::new("crash", MethodKind::Transform, "always fails")
        .with_factory(|| Box::new(Crash))
}

#[tokio::test]
async fn finalizer_failure_during_recovery_is_reported_and_swallowed() {
    let diag = Arc::new(RecordingDiagnostics::default());
    let mut registry = MethodRegistry::with_builtins();
    registry.register(grumble_descriptor());
    registry.register(crash_descriptor());
    let mut builder = QueueBuilder::new(&registry);
    let mut pipeline = builder
        .build("sine_source 3 8\ngrumble\ncrash\nnull_sink\n")
        .unwrap();
    let mut ctx = ExecContext::with_diagnostics(diag.clone());
    let err = pipeline.run(&mut ctx).await.unwrap_err();
    // the execute fatal wins, not the finalizer's
    assert!(err.to_string().contains("mid-run failure"));
    // the broken finalizer landed in the diagnostics sink
    assert!(diag.error_containing("finalizer breakdown"));
    // finalizers after the broken one still ran
    assert!(LATE_FINALIZED.load(Ordering::SeqCst));
}

#[tokio::test]
async fn finalizer_failure_without_a_prior_fatal_is_the_run_error() {
    let mut registry = MethodRegistry::with_builtins();
    registry.register(grumble_descriptor());
    let mut builder = QueueBuilder::new(&registry);
    let mut pipeline = builder
        .build("sine_source 2 8\ngrumble\nnull_sink\n")
        .unwrap();
    let mut ctx = ExecContext::new();
    let err = pipeline.run(&mut ctx).await.unwrap_err();
    assert!(err.to_string().contains("finalizer breakdown"));
    assert_eq!(ctx.accepted_epochs, 2);
}
