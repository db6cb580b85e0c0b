use crate::core::{Epoch, ExecContext, MethodKind};
use crate::engine::queue::{Pipeline, Queue};
use anyhow::{Error, Result};

/// What a single pass through the iterated queue amounted to.
pub(crate) enum PassOutcome {
    /// An epoch made it through the whole chain
    Produced(Epoch),
    /// The collect method swallowed the epoch and is still accumulating
    CollectPending,
    /// A method between the sources and the collect dropped the epoch
    Rejected,
    /// Every source slot is exhausted
    NoMoreEpochs,
}

/// Accounting for one complete pipeline run.
#[derive(Debug)]
pub struct RunSummary {
    /// The surviving end result, after post-processing if a `Post:` queue
    /// was given
    pub result: Option<Epoch>,
    pub accepted: u64,
    pub rejected: u64,
}

impl Pipeline {
    /// Run the iterated queue to exhaustion, finalize it, then push any end
    /// result through the post-processing queue.
    pub async fn run(&mut self, ctx: &mut ExecContext) -> Result<RunSummary> {
        run_pipeline(self, ctx).await
    }
}

/// One pass: draw an epoch from the current source slot and push it through
/// the rest of the chain.
///
/// A source that returns nothing is finalized on the spot and its slot is
/// skipped for good; the cursor never moves back to an earlier alternate.
pub(crate) async fn run_once(queue: &mut Queue, ctx: &mut ExecContext) -> Result<PassOutcome> {
    if queue.source_region == 0 || queue.current_source >= queue.source_region {
        return Ok(PassOutcome::NoMoreEpochs);
    }
    let mut index = queue.current_source;
    let mut data: Option<Epoch> = None;
    while index < queue.instances.len() {
        if index < queue.source_region {
            let region_end = queue.source_region;
            let instance = &mut queue.instances[index];
            instance.ensure_init(ctx).await?;
            match instance.method.execute(ctx, None).await? {
                Some(epoch) => {
                    data = Some(epoch);
                    index = region_end;
                }
                None => {
                    // exhausted: close this source and move to the next slot
                    if instance.init_done {
                        instance.init_done = false;
                        let _ = instance.method.finalize(ctx, None).await?;
                    }
                    index += 1;
                    queue.current_source = index;
                    if index >= region_end {
                        return Ok(PassOutcome::NoMoreEpochs);
                    }
                }
            }
        } else {
            let instance = &mut queue.instances[index];
            instance.ensure_init(ctx).await?;
            match instance.method.execute(ctx, data.take()).await? {
                Some(epoch) => {
                    data = Some(epoch);
                    index += 1;
                }
                None => {
                    if instance.kind() == MethodKind::Collect {
                        return Ok(PassOutcome::CollectPending);
                    }
                    ctx.trace(1, &format!("{} rejected the epoch", instance.name()));
                    return Ok(PassOutcome::Rejected);
                }
            }
        }
    }
    match data {
        Some(epoch) => Ok(PassOutcome::Produced(epoch)),
        None => Ok(PassOutcome::NoMoreEpochs),
    }
}

/// Run the finalizers of every initialized instance, front to back, feeding
/// each the result so far. When `recovery` is set (a fatal error already
/// happened) finalizer errors are reported and swallowed; otherwise the
/// first one becomes the queue's error and later ones are only reported.
async fn finalize_queue(
    queue: &mut Queue,
    ctx: &mut ExecContext,
    mut result: Option<Epoch>,
    recovery: bool,
) -> (Option<Epoch>, Option<Error>) {
    let mut first_error: Option<Error> = None;
    for instance in &mut queue.instances {
        if !instance.init_done {
            continue;
        }
        instance.init_done = false;
        match instance.method.finalize(ctx, result.take()).await {
            Ok(r) => result = r,
            Err(e) => {
                if recovery || first_error.is_some() {
                    ctx.error(&format!("{}: error during finalization: {e:#}", instance.name()));
                }
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }
    if recovery {
        (result, None)
    } else {
        (result, first_error)
    }
}

/// Straight single pass through the post-processing queue.
async fn run_post(queue: &mut Queue, ctx: &mut ExecContext, input: Epoch) -> Result<Option<Epoch>> {
    let mut data = Some(input);
    for instance in &mut queue.instances {
        instance.ensure_init(ctx).await?;
        data = instance.method.execute(ctx, data.take()).await?;
        if data.is_none() {
            ctx.trace(0, "the post-processing queue returned no data");
            break;
        }
    }
    Ok(data)
}

/// The full driver loop around [`run_once`].
///
/// Epochs swallowed by the collect method count as accepted. The stop signal
/// is honored after every pass, whatever its outcome. A fatal error ends
/// iteration, but finalizers still run before the error is handed back.
pub async fn run_pipeline(pipeline: &mut Pipeline, ctx: &mut ExecContext) -> Result<RunSummary> {
    pipeline.iterated.reset();
    let mut last: Option<Epoch> = None;
    let mut fatal: Option<Error> = None;

    loop {
        match run_once(&mut pipeline.iterated, ctx).await {
            Ok(PassOutcome::Produced(epoch)) => {
                ctx.accepted_epochs += 1;
                last = Some(epoch);
            }
            Ok(PassOutcome::CollectPending) => {
                ctx.accepted_epochs += 1;
            }
            Ok(PassOutcome::Rejected) => {
                ctx.rejected_epochs += 1;
            }
            Ok(PassOutcome::NoMoreEpochs) => break,
            Err(e) => {
                fatal = Some(e);
                break;
            }
        }
        if ctx.stop_requested {
            ctx.trace(1, "stop requested, leaving the iteration loop");
            break;
        }
    }

    let (result, finalize_error) =
        finalize_queue(&mut pipeline.iterated, ctx, last, fatal.is_some()).await;
    if fatal.is_none() {
        fatal = finalize_error;
    }
    if let Some(e) = fatal {
        return Err(e);
    }

    let Some(epoch) = result else {
        if !pipeline.post.is_empty() {
            ctx.trace(0, "no valid epoch resulted from the iterated queue");
        }
        return Ok(RunSummary {
            result: None,
            accepted: ctx.accepted_epochs,
            rejected: ctx.rejected_epochs,
        });
    };

    if pipeline.post.is_empty() {
        ctx.trace(0, "an end result is available but there is no Post: queue");
        return Ok(RunSummary {
            result: Some(epoch),
            accepted: ctx.accepted_epochs,
            rejected: ctx.rejected_epochs,
        });
    }

    let post_result = match run_post(&mut pipeline.post, ctx, epoch).await {
        Ok(r) => r,
        Err(e) => {
            let _ = finalize_queue(&mut pipeline.post, ctx, None, true).await;
            return Err(e);
        }
    };
    let (post_result, post_error) =
        finalize_queue(&mut pipeline.post, ctx, post_result, false).await;
    if let Some(e) = post_error {
        return Err(e);
    }
    Ok(RunSummary {
        result: post_result,
        accepted: ctx.accepted_epochs,
        rejected: ctx.rejected_epochs,
    })
}
