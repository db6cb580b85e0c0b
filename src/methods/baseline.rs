use crate::args::{ArgDescriptor, ArgKind, ArgValues};
use crate::core::{Epoch, ExecContext, Method, MethodKind};
use crate::registry::{MethodDescriptor, MethodDescriptorFactoryWrapper};

use anyhow::Result;
use async_trait::async_trait;

const ARG_MODE: usize = 0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Mode {
    #[default]
    Subtract,
    Divide,
}

/// Per-channel baseline correction: subtract the channel mean, or divide by
/// it. Division leaves channels with a near-zero mean untouched.
#[derive(Debug, Default)]
pub struct Baseline {
    mode: Mode,
}

#[async_trait]
impl Method for Baseline {
    async fn init(&mut self, _ctx: &mut ExecContext, args: &ArgValues) -> Result<()> {
        self.mode = match args.choice(ARG_MODE) {
            Some(1) => Mode::Divide,
            _ => Mode::Subtract,
        };
        Ok(())
    }

    async fn execute(
        &mut self,
        _ctx: &mut ExecContext,
        input: Option<Epoch>,
    ) -> Result<Option<Epoch>> {
        let Some(mut epoch) = input else {
            return Ok(None);
        };
        for samples in epoch.payload.values_mut() {
            if samples.is_empty() {
                continue;
            }
            let mean = samples.iter().sum::<f64>() / samples.len() as f64;
            match self.mode {
                Mode::Subtract => {
                    for sample in samples.iter_mut() {
                        *sample -= mean;
                    }
                }
                Mode::Divide => {
                    if mean.abs() > f64::EPSILON {
                        for sample in samples.iter_mut() {
                            *sample /= mean;
                        }
                    }
                }
            }
        }
        Ok(Some(epoch))
    }
}

fn descriptor() -> MethodDescriptor {
    MethodDescriptor::new(
        "baseline",
        MethodKind::Transform,
        "Remove the per-channel baseline",
    )
    .with_factory(|| Box::<Baseline>::default())
    .add_argument(
        ArgDescriptor::required(ArgKind::Selection, "correction mode")
            .with_choices(&["subtract", "divide"]),
    )
}

inventory::submit! {
    MethodDescriptorFactoryWrapper(descriptor)
}
