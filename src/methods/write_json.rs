use crate::args::{ArgDescriptor, ArgKind, ArgValues};
use crate::core::{Epoch, ExecContext, Method, MethodKind};
use crate::registry::{MethodDescriptor, MethodDescriptorFactoryWrapper};

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

const ARG_APPEND: usize = 0;
const ARG_FILE: usize = 1;

/// Epoch sink appending each epoch as one JSON line to a file, then passing
/// the epoch on unchanged. Without `-a` the file is truncated first.
#[derive(Debug, Default)]
pub struct WriteJson {
    path: String,
    append: bool,
}

#[async_trait]
impl Method for WriteJson {
    async fn init(&mut self, _ctx: &mut ExecContext, args: &ArgValues) -> Result<()> {
        self.path = args
            .string(ARG_FILE)
            .context("write_json: no output file bound")?
            .to_string();
        self.append = args.is_set(ARG_APPEND);
        if !self.append {
            tokio::fs::write(&self.path, b"")
                .await
                .with_context(|| format!("write_json: cannot create {}", self.path))?;
        }
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
        let mut line = serde_json::to_string(&epoch)
            .with_context(|| format!("write_json: cannot encode epoch {}", epoch.sequence))?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("write_json: cannot open {}", self.path))?;
        file.write_all(line.as_bytes())
            .await
            .with_context(|| format!("write_json: cannot write {}", self.path))?;
        // dropping a tokio File flushes in the background; the line must be
        // durable before the epoch moves on
        file.flush()
            .await
            .with_context(|| format!("write_json: cannot flush {}", self.path))?;
        Ok(Some(epoch))
    }
}

fn descriptor() -> MethodDescriptor {
    MethodDescriptor::new(
        "write_json",
        MethodKind::PutEpoch,
        "Append epochs to a file as JSON lines",
    )
    .with_factory(|| Box::<WriteJson>::default())
    .add_argument(ArgDescriptor::switch(
        "a",
        ArgKind::Nothing,
        "append to the file instead of truncating it",
    ))
    .add_argument(ArgDescriptor::required(ArgKind::Filename, "output file"))
}

inventory::submit! {
    MethodDescriptorFactoryWrapper(descriptor)
}
