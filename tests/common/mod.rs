use epochq::core::Diagnostics;
use std::sync::Mutex;

/// Diagnostics sink recording everything for later assertions.
#[derive(Default)]
pub struct RecordingDiagnostics {
    pub traces: Mutex<Vec<(i32, String)>>,
    pub errors: Mutex<Vec<String>>,
}

impl Diagnostics for RecordingDiagnostics {
    fn trace(&self, level: i32, msg: &str) {
        self.traces.lock().unwrap().push((level, msg.to_string()));
    }

    fn error(&self, msg: &str) {
        self.errors.lock().unwrap().push(msg.to_string());
    }
}

impl RecordingDiagnostics {
    pub fn trace_containing(&self, needle: &str) -> bool {
        self.traces
            .lock()
            .unwrap()
            .iter()
            .any(|(_, msg)| msg.contains(needle))
    }

    pub fn error_containing(&self, needle: &str) -> bool {
        self.errors
            .lock()
            .unwrap()
            .iter()
            .any(|msg| msg.contains(needle))
    }
}
