use std::sync::Arc;

/// Host-supplied sink for leveled trace messages and fatal-error reports.
///
/// The engine never terminates the process itself; everything it has to say
/// goes through this interface. Level 0 is reserved for unsuppressable
/// messages (nonfatal errors), levels 1..3 for successively more detail.
pub trait Diagnostics: Send + Sync {
    fn trace(&self, level: i32, msg: &str);
    fn error(&self, msg: &str);
}

/// Default sink routing through the `tracing` facade.
#[derive(Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn trace(&self, level: i32, msg: &str) {
        match level {
            i32::MIN..=0 => tracing::info!(target: "epochq", "{msg}"),
            1 => tracing::debug!(target: "epochq", "{msg}"),
            _ => tracing::trace!(target: "epochq", "{msg}"),
        }
    }

    fn error(&self, msg: &str) {
        tracing::error!(target: "epochq", "{msg}");
    }
}

/// The single mutable state threaded through one pipeline run.
///
/// Exactly one method instance sees the context at a time; epoch payloads
/// are owned by the engine and moved through the execute calls, not stored
/// here.
pub struct ExecContext {
    pub accepted_epochs: u64,
    pub rejected_epochs: u64,

    /// Cooperative stop: observed between epoch iterations, never mid-chain.
    pub stop_requested: bool,

    /// Level of detail for trace messages; 0 shows only unsuppressable ones.
    pub trace_level: i32,

    diag: Arc<dyn Diagnostics>,
}

impl ExecContext {
    pub fn new() -> Self {
        Self::with_diagnostics(Arc::new(TracingDiagnostics))
    }

    pub fn with_diagnostics(diag: Arc<dyn Diagnostics>) -> Self {
        Self {
            accepted_epochs: 0,
            rejected_epochs: 0,
            stop_requested: false,
            trace_level: 0,
            diag,
        }
    }

    pub fn trace(&self, level: i32, msg: &str) {
        if level <= 0 || level <= self.trace_level {
            self.diag.trace(level, msg);
        }
    }

    pub fn error(&self, msg: &str) {
        self.diag.error(msg);
    }

    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    pub fn diagnostics(&self) -> Arc<dyn Diagnostics> {
        Arc::clone(&self.diag)
    }
}

impl Default for ExecContext {
    fn default() -> Self {
        Self::new()
    }
}
