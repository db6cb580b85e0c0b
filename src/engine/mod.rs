//! The queue engine: building pipelines from scripts, running them and
//! moving them across process boundaries as dumps.

pub mod builder;
pub mod dump;
pub mod executor;
pub mod printer;
pub mod queue;

pub use builder::QueueBuilder;
pub use dump::{InstanceDump, PipelineDump, QueueDump};
pub use executor::{run_pipeline, RunSummary};
pub use printer::format_script;
pub use queue::{MethodInstance, Pipeline, Queue};
