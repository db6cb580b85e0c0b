use super::{Epoch, ExecContext};
use crate::args::ArgValues;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The five capability kinds a method can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodKind {
    /// Epoch source; opens the iterated queue, may have branch alternates
    GetEpoch,
    /// Epoch sink; passes its input through after writing it out
    PutEpoch,
    /// Aggregator; closes the iterated queue, usually emits at finalize
    Collect,
    /// In-place or derived mutation of the epoch
    Transform,
    /// Accept/reject/stop decision
    Reject,
}

impl MethodKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetEpoch => "get_epoch",
            Self::PutEpoch => "put_epoch",
            Self::Collect => "collect",
            Self::Transform => "transform",
            Self::Reject => "reject",
        }
    }
}

/// Per-instance behavior of a processing stage.
///
/// Implementations hold their own state; it is created by the descriptor
/// factory when the instance is built into a queue and dropped when the
/// queue is torn down. `init` runs lazily, just before the first `execute`,
/// with the bound arguments of the instance. `finalize` runs once per run
/// for every initialized instance and may replace the result it is handed.
///
/// `execute` returning `Ok(None)` is rejection ("no data"), not an error;
/// `Err` is a fatal runtime condition that aborts the current pass.
#[async_trait]
pub trait Method: Send {
    async fn init(&mut self, ctx: &mut ExecContext, args: &ArgValues) -> Result<()> {
        let _ = (ctx, args);
        Ok(())
    }

    async fn execute(
        &mut self,
        ctx: &mut ExecContext,
        input: Option<Epoch>,
    ) -> Result<Option<Epoch>>;

    async fn finalize(
        &mut self,
        ctx: &mut ExecContext,
        result: Option<Epoch>,
    ) -> Result<Option<Epoch>> {
        let _ = ctx;
        Ok(result)
    }
}
