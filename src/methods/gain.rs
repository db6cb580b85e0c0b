use crate::args::{ArgDescriptor, ArgKind, ArgValues};
use crate::core::{Epoch, ExecContext, Method, MethodKind};
use crate::registry::{MethodDescriptor, MethodDescriptorFactoryWrapper};

use anyhow::Result;
use async_trait::async_trait;

const ARG_FACTOR: usize = 0;

/// Multiply every sample by a constant factor.
#[derive(Debug, Default)]
pub struct Gain {
    factor: f64,
}

#[async_trait]
impl Method for Gain {
    async fn init(&mut self, _ctx: &mut ExecContext, args: &ArgValues) -> Result<()> {
        self.factor = args.float_or(ARG_FACTOR, 1.0);
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
            for sample in samples.iter_mut() {
                *sample *= self.factor;
            }
        }
        Ok(Some(epoch))
    }
}

fn descriptor() -> MethodDescriptor {
    MethodDescriptor::new("gain", MethodKind::Transform, "Scale all samples by a factor")
        .with_factory(|| Box::<Gain>::default())
        .add_argument(ArgDescriptor::required(ArgKind::Float, "gain factor"))
}

inventory::submit! {
    MethodDescriptorFactoryWrapper(descriptor)
}
