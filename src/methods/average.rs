use crate::args::{ArgDescriptor, ArgKind, ArgValues};
use crate::core::{Epoch, ExecContext, Method, MethodKind};
use crate::registry::{MethodDescriptor, MethodDescriptorFactoryWrapper};

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

const ARG_SUM: usize = 0;

/// Collect method accumulating a point-by-point average over all incoming
/// epochs. Emits nothing while accumulating; the averaged epoch appears at
/// finalization, carrying the epoch count in its metadata. With `-s` the
/// plain sum is emitted instead.
#[derive(Debug, Default)]
pub struct Average {
    output_sum: bool,
    sums: HashMap<String, Vec<f64>>,
    sfreq: f64,
    count: u64,
}

#[async_trait]
impl Method for Average {
    async fn init(&mut self, _ctx: &mut ExecContext, args: &ArgValues) -> Result<()> {
        self.output_sum = args.is_set(ARG_SUM);
        self.sums.clear();
        self.sfreq = 0.0;
        self.count = 0;
        Ok(())
    }

    async fn execute(
        &mut self,
        _ctx: &mut ExecContext,
        input: Option<Epoch>,
    ) -> Result<Option<Epoch>> {
        let Some(epoch) = input else {
            return Ok(None);
        };
        if self.count == 0 {
            self.sfreq = epoch.sfreq;
        }
        for (name, samples) in epoch.payload {
            let sum = self.sums.entry(name).or_default();
            if sum.len() < samples.len() {
                sum.resize(samples.len(), 0.0);
            }
            for (acc, sample) in sum.iter_mut().zip(samples) {
                *acc += sample;
            }
        }
        self.count += 1;
        Ok(None)
    }

    async fn finalize(
        &mut self,
        ctx: &mut ExecContext,
        _result: Option<Epoch>,
    ) -> Result<Option<Epoch>> {
        if self.count == 0 {
            return Ok(None);
        }
        ctx.trace(1, &format!("averaging {} epoch(s)", self.count));
        let mut epoch = Epoch::new(0, self.sfreq);
        let scale = if self.output_sum {
            1.0
        } else {
            1.0 / self.count as f64
        };
        for (name, sum) in self.sums.drain() {
            epoch
                .payload
                .insert(name, sum.into_iter().map(|s| s * scale).collect());
        }
        epoch
            .metadata
            .insert("averages".to_string(), self.count.to_string());
        self.count = 0;
        Ok(Some(epoch))
    }
}

fn descriptor() -> MethodDescriptor {
    MethodDescriptor::new(
        "average",
        MethodKind::Collect,
        "Average all incoming epochs point by point",
    )
    .with_factory(|| Box::<Average>::default())
    .add_argument(ArgDescriptor::switch(
        "s",
        ArgKind::Nothing,
        "output the sum instead of the average",
    ))
}

inventory::submit! {
    MethodDescriptorFactoryWrapper(descriptor)
}
