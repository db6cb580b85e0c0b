pub mod context;
pub mod epoch;
pub mod method;

pub use context::{Diagnostics, ExecContext, TracingDiagnostics};
pub use epoch::Epoch;
pub use method::{Method, MethodKind};
