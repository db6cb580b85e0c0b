use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One unit of multichannel data, produced by an epoch source and handed
/// from method to method along the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Epoch {
    /// Sequential epoch number assigned by the producing source
    pub sequence: u64,

    /// Sampling frequency in Hz
    pub sfreq: f64,

    /// Per-channel sample data keyed by channel name
    pub payload: HashMap<String, Vec<f64>>,

    /// Side-channel information (comment, trigger code, averages, ...)
    pub metadata: HashMap<String, String>,
}

impl Epoch {
    pub fn new(sequence: u64, sfreq: f64) -> Self {
        Self {
            sequence,
            sfreq,
            payload: HashMap::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn channel(&self, name: &str) -> Option<&[f64]> {
        self.payload.get(name).map(|v| v.as_slice())
    }

    pub fn nr_of_channels(&self) -> usize {
        self.payload.len()
    }

    /// Number of points in the longest channel.
    pub fn nr_of_points(&self) -> usize {
        self.payload.values().map(|v| v.len()).max().unwrap_or(0)
    }
}
