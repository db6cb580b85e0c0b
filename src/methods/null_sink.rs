use crate::core::{Epoch, ExecContext, Method, MethodKind};
use crate::registry::{MethodDescriptor, MethodDescriptorFactoryWrapper};

use anyhow::Result;
use async_trait::async_trait;

/// Collect method that discards everything. Closes queues that are run for
/// their side effects only.
#[derive(Debug, Default)]
pub struct NullSink;

#[async_trait]
impl Method for NullSink {
    async fn execute(
        &mut self,
        _ctx: &mut ExecContext,
        _input: Option<Epoch>,
    ) -> Result<Option<Epoch>> {
        Ok(None)
    }
}

fn descriptor() -> MethodDescriptor {
    MethodDescriptor::new("null_sink", MethodKind::Collect, "Discard all epochs")
        .with_factory(|| Box::<NullSink>::default())
}

inventory::submit! {
    MethodDescriptorFactoryWrapper(descriptor)
}
