use crate::args::{ArgDescriptor, ArgKind, ArgValues};
use crate::core::{Epoch, ExecContext, Method, MethodKind};
use crate::registry::{MethodDescriptor, MethodDescriptorFactoryWrapper};

use anyhow::Result;
use async_trait::async_trait;

const ARG_STOP_AFTER: usize = 0;
const ARG_THRESHOLD: usize = 1;

/// Drop epochs whose absolute amplitude exceeds a threshold on any channel.
/// With `-s n`, request a stop once n epochs have passed the test.
#[derive(Debug, Default)]
pub struct RejectLevel {
    threshold: f64,
    stop_after: Option<u64>,
    passed: u64,
}

#[async_trait]
impl Method for RejectLevel {
    async fn init(&mut self, _ctx: &mut ExecContext, args: &ArgValues) -> Result<()> {
        self.threshold = args.float_or(ARG_THRESHOLD, f64::INFINITY);
        self.stop_after = args.int(ARG_STOP_AFTER).map(|n| n.max(0) as u64);
        self.passed = 0;
        Ok(())
    }

    async fn execute(
        &mut self,
        ctx: &mut ExecContext,
        input: Option<Epoch>,
    ) -> Result<Option<Epoch>> {
        let Some(epoch) = input else {
            return Ok(None);
        };
        let over = epoch
            .payload
            .values()
            .flatten()
            .any(|sample| sample.abs() > self.threshold);
        if over {
            ctx.trace(
                2,
                &format!("epoch {} exceeds level {}", epoch.sequence, self.threshold),
            );
            return Ok(None);
        }
        self.passed += 1;
        if self.stop_after == Some(self.passed) {
            ctx.request_stop();
        }
        Ok(Some(epoch))
    }
}

fn descriptor() -> MethodDescriptor {
    MethodDescriptor::new(
        "reject_level",
        MethodKind::Reject,
        "Reject epochs above an amplitude threshold",
    )
    .with_factory(|| Box::<RejectLevel>::default())
    .add_argument(ArgDescriptor::switch(
        "s",
        ArgKind::Integer,
        "stop after accepting this many epochs",
    ))
    .add_argument(ArgDescriptor::required(
        ArgKind::Float,
        "absolute amplitude threshold",
    ))
}

inventory::submit! {
    MethodDescriptorFactoryWrapper(descriptor)
}
