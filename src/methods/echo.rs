use crate::args::{ArgDescriptor, ArgKind, ArgValues};
use crate::core::{Epoch, ExecContext, Method, MethodKind};
use crate::registry::{MethodDescriptor, MethodDescriptorFactoryWrapper};

use anyhow::Result;
use async_trait::async_trait;

const ARG_PREFIX: usize = 0;
const ARG_TEXT: usize = 1;

/// Emit a fixed message through the diagnostics sink for every epoch that
/// passes, leaving the epoch untouched. Useful for instrumenting scripts.
#[derive(Debug, Default)]
pub struct Echo {
    prefix: Option<String>,
    text: String,
}

#[async_trait]
impl Method for Echo {
    async fn init(&mut self, _ctx: &mut ExecContext, args: &ArgValues) -> Result<()> {
        self.prefix = args.string(ARG_PREFIX).map(str::to_string);
        self.text = args.string(ARG_TEXT).unwrap_or_default().to_string();
        Ok(())
    }

    async fn execute(
        &mut self,
        ctx: &mut ExecContext,
        input: Option<Epoch>,
    ) -> Result<Option<Epoch>> {
        match &self.prefix {
            Some(prefix) => ctx.trace(0, &format!("{prefix}: {}", self.text)),
            None => ctx.trace(0, &self.text),
        }
        Ok(input)
    }
}

fn descriptor() -> MethodDescriptor {
    MethodDescriptor::new("echo", MethodKind::Transform, "Print a message per epoch")
        .with_factory(|| Box::<Echo>::default())
        .add_argument(ArgDescriptor::switch("p", ArgKind::Word, "prefix word"))
        .add_argument(ArgDescriptor::required(ArgKind::Sentence, "text to print"))
}

inventory::submit! {
    MethodDescriptorFactoryWrapper(descriptor)
}
