//! Built-in processing methods. Each one submits its descriptor through
//! `inventory`, so [`crate::registry::MethodRegistry::with_builtins`] picks
//! them all up without a hand-maintained list.

pub mod average;
pub mod baseline;
pub mod echo;
pub mod gain;
pub mod null_sink;
pub mod reject_level;
pub mod sine_source;
pub mod write_json;

pub use average::Average;
pub use baseline::Baseline;
pub use echo::Echo;
pub use gain::Gain;
pub use null_sink::NullSink;
pub use reject_level::RejectLevel;
pub use sine_source::SineSource;
pub use write_json::WriteJson;
