use crate::args::{ArgDescriptor, ArgKind, ArgValues};
use crate::core::{Epoch, ExecContext, Method, MethodKind};
use crate::registry::{MethodDescriptor, MethodDescriptorFactoryWrapper};

use anyhow::Result;
use async_trait::async_trait;
use std::f64::consts::TAU;

const ARG_EPOCHS: usize = 0;
const ARG_POINTS: usize = 1;
const ARG_FREQ: usize = 2;
const ARG_SFREQ: usize = 3;
const ARG_CHANNELS: usize = 4;

/// Epoch source producing a fixed number of sinusoid test epochs. The
/// waveform is continuous across epochs; each channel gets a phase offset
/// so multichannel output is distinguishable.
#[derive(Debug, Default)]
pub struct SineSource {
    epochs: u64,
    points: usize,
    frequency: f64,
    sfreq: f64,
    channels: usize,
    produced: u64,
}

#[async_trait]
impl Method for SineSource {
    async fn init(&mut self, _ctx: &mut ExecContext, args: &ArgValues) -> Result<()> {
        self.epochs = args.int_or(ARG_EPOCHS, 100).max(0) as u64;
        self.points = args.int_or(ARG_POINTS, 64).max(1) as usize;
        self.frequency = args.float_or(ARG_FREQ, 440.0);
        self.sfreq = args.float_or(ARG_SFREQ, 48000.0);
        self.channels = args.int_or(ARG_CHANNELS, 1).max(1) as usize;
        self.produced = 0;
        Ok(())
    }

    async fn execute(
        &mut self,
        _ctx: &mut ExecContext,
        _input: Option<Epoch>,
    ) -> Result<Option<Epoch>> {
        if self.produced >= self.epochs {
            return Ok(None);
        }
        let mut epoch = Epoch::new(self.produced, self.sfreq);
        let step = TAU * self.frequency / self.sfreq;
        let offset = self.produced as usize * self.points;
        for ch in 0..self.channels {
            let phase = ch as f64 * 0.5;
            let samples = (0..self.points)
                .map(|i| ((offset + i) as f64 * step + phase).sin())
                .collect();
            epoch.payload.insert(format!("ch{}", ch + 1), samples);
        }
        self.produced += 1;
        Ok(Some(epoch))
    }
}

fn descriptor() -> MethodDescriptor {
    MethodDescriptor::new(
        "sine_source",
        MethodKind::GetEpoch,
        "Generate sinusoid test epochs",
    )
    .with_factory(|| Box::<SineSource>::default())
    .add_argument(
        ArgDescriptor::optional(ArgKind::Integer, "number of epochs")
            .with_companions(1)
            .with_default(100.0),
    )
    .add_argument(ArgDescriptor::optional(ArgKind::Integer, "points per epoch").with_default(64.0))
    .add_argument(ArgDescriptor::switch("f", ArgKind::Float, "frequency in Hz").with_default(440.0))
    .add_argument(
        ArgDescriptor::switch("s", ArgKind::Float, "sampling frequency in Hz")
            .with_default(48000.0),
    )
    .add_argument(ArgDescriptor::switch("c", ArgKind::Integer, "number of channels").with_default(1.0))
}

inventory::submit! {
    MethodDescriptorFactoryWrapper(descriptor)
}
