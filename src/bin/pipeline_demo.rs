use epochq::core::{Diagnostics, ExecContext};
use epochq::engine::{format_script, QueueBuilder};
use epochq::registry::MethodRegistry;

use anyhow::Result;
use std::sync::Arc;

struct StdoutDiagnostics;

impl Diagnostics for StdoutDiagnostics {
    fn trace(&self, level: i32, msg: &str) {
        println!("[{level}] {msg}");
    }

    fn error(&self, msg: &str) {
        eprintln!("ERROR: {msg}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("epochq - scripted pipeline demo");
    println!("===============================\n");

    let registry = MethodRegistry::with_builtins();
    println!("Registered methods:\n{}", registry.list());

    let script = "\
sine_source 10 64 -f 220 -c 2
baseline subtract
gain $1
reject_level 1.5
average
Post:
echo averaged result ready
write_json demo_average.json
";
    println!("Script:\n{script}");

    let mut builder = QueueBuilder::new(&registry);
    let mut pipeline = builder.build(script)?;

    let mut ctx = ExecContext::with_diagnostics(Arc::new(StdoutDiagnostics));
    ctx.trace_level = 1;
    pipeline.apply_variables(&["0.5".to_string()], &StdoutDiagnostics)?;

    println!("Regenerated script:\n{}", format_script(&pipeline));

    let summary = pipeline.run(&mut ctx).await?;
    println!(
        "\nRun finished: {} accepted, {} rejected",
        summary.accepted, summary.rejected
    );
    if let Some(result) = &summary.result {
        println!(
            "Result epoch: {} channel(s), {} point(s), metadata {:?}",
            result.nr_of_channels(),
            result.nr_of_points(),
            result.metadata
        );
    }

    let dump = pipeline.dump();
    println!("\nDump:\n{}", dump.to_json()?);
    let reloaded = dump.reload(&registry)?;
    println!("Reloaded script:\n{}", format_script(&reloaded));

    Ok(())
}
