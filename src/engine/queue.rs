use crate::args::{bind, ArgCursor, ArgData, ArgValues, BindOutcome};
use crate::core::{Diagnostics, ExecContext, Method, MethodKind};
use crate::error::BuildError;
use crate::registry::MethodDescriptor;
use anyhow::Result;
use std::fmt;
use std::sync::Arc;

/// One configured method occurrence in a queue: shared schema, bound
/// arguments and the private state object created from the factory.
pub struct MethodInstance {
    pub descriptor: Arc<MethodDescriptor>,
    pub args: ArgValues,
    pub method: Box<dyn Method>,
    /// Source-slot alternate, marked `>` in the script
    pub branch: bool,
    /// Transform promoted to epoch source, marked `!` in the script
    pub epoch_override: bool,
    pub init_done: bool,
    pub script: u32,
    pub line: u32,
}

impl MethodInstance {
    pub fn new(
        descriptor: Arc<MethodDescriptor>,
        args: ArgValues,
        branch: bool,
        epoch_override: bool,
        script: u32,
        line: u32,
    ) -> Self {
        let method = descriptor.create_instance();
        Self {
            descriptor,
            args,
            method,
            branch,
            epoch_override,
            init_done: false,
            script,
            line,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn kind(&self) -> MethodKind {
        self.descriptor.kind
    }

    /// Whether this instance may occupy a source slot.
    pub fn is_source(&self) -> bool {
        self.kind() == MethodKind::GetEpoch || self.epoch_override
    }

    pub async fn ensure_init(&mut self, ctx: &mut ExecContext) -> Result<()> {
        if !self.init_done {
            self.method.init(ctx, &self.args).await?;
            self.init_done = true;
        }
        Ok(())
    }
}

// The state object behind `method` is opaque, so Debug shows everything else.
impl fmt::Debug for MethodInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInstance")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .field("args", &self.args)
            .field("branch", &self.branch)
            .field("epoch_override", &self.epoch_override)
            .field("init_done", &self.init_done)
            .field("script", &self.script)
            .field("line", &self.line)
            .finish_non_exhaustive()
    }
}

/// A linear chain of method instances. The leading `source_region` entries
/// are epoch sources and their `>` alternates; `current_source` is the slot
/// currently being drawn from and only ever moves forward.
#[derive(Debug, Default)]
pub struct Queue {
    pub instances: Vec<MethodInstance>,
    pub source_region: usize,
    pub current_source: usize,
    collect_at: Option<usize>,
}

impl Queue {
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn reset(&mut self) {
        self.current_source = 0;
    }

    /// Append one instance, enforcing the shape rules for its position.
    /// Used both when building from a script and when reloading a dump.
    pub(crate) fn push_checked(
        &mut self,
        instance: MethodInstance,
        is_iterated: bool,
    ) -> Result<(), BuildError> {
        let method = instance.name().to_string();
        let (script, line) = (instance.script, instance.line);

        if instance.epoch_override && instance.kind() != MethodKind::Transform {
            return Err(BuildError::OverrideNotTransform {
                method,
                script,
                line,
            });
        }
        if instance.branch {
            if instance.kind() == MethodKind::Collect {
                return Err(BuildError::BranchedCollect {
                    method,
                    script,
                    line,
                });
            }
            // A branch extends the source region; it must arrive while that
            // region is still the whole queue and is not empty.
            if !is_iterated || self.instances.is_empty() || self.instances.len() != self.source_region
            {
                return Err(BuildError::MisplacedBranch {
                    method,
                    script,
                    line,
                });
            }
            self.source_region += 1;
        } else if instance.is_source() {
            if !is_iterated || self.instances.len() != self.source_region {
                return Err(BuildError::MisplacedGetEpoch {
                    method,
                    script,
                    line,
                });
            }
            self.source_region += 1;
        } else {
            if is_iterated && self.instances.is_empty() {
                return Err(BuildError::FirstNotSource {
                    method,
                    script,
                    line,
                });
            }
            if instance.kind() == MethodKind::Collect {
                if !is_iterated {
                    return Err(BuildError::CollectInPost {
                        method,
                        script,
                        line,
                    });
                }
                if self.collect_at.is_some() {
                    return Err(BuildError::MultipleCollect {
                        method,
                        script,
                        line,
                    });
                }
                self.collect_at = Some(self.instances.len());
            }
        }
        self.instances.push(instance);
        Ok(())
    }

    /// A non-empty iterated queue must end in its collect method.
    pub(crate) fn check_closed(&self, script: u32) -> Result<(), BuildError> {
        if self.instances.is_empty() {
            return Ok(());
        }
        match self.collect_at {
            Some(at) if at == self.instances.len() - 1 => Ok(()),
            other => Err(BuildError::MissingCollect {
                script,
                hint: other.is_some(),
            }),
        }
    }

    /// Resolve deferred `$N` arguments against host-supplied values.
    ///
    /// Returns the highest variable number referenced anywhere in the queue.
    /// References beyond the supplied list are left for the caller to judge;
    /// a supplied value the descriptor will not accept is fatal.
    pub(crate) fn apply_variables(&mut self, values: &[String]) -> Result<usize, BuildError> {
        let mut max_referenced = 0;
        for instance in &mut self.instances {
            let descriptor = Arc::clone(&instance.descriptor);
            for (argno, value) in instance.args.iter_mut().enumerate() {
                let Some(n) = value.variable else { continue };
                if n > max_referenced {
                    max_referenced = n;
                }
                let Some(supplied) = values.get(n - 1) else {
                    continue;
                };
                // Clear the slot so bind accepts it, then put the variable
                // tag back so reprinting still shows `$N`.
                value.variable = None;
                value.data = ArgData::Unset;
                let mut cursor = ArgCursor::whole_value(supplied);
                let outcome = bind(&descriptor.arguments[argno], value, &mut cursor);
                value.variable = Some(n);
                if outcome != BindOutcome::Bound {
                    return Err(BuildError::VariableBind {
                        value: supplied.clone(),
                        description: descriptor.arguments[argno].description.clone(),
                    });
                }
            }
        }
        Ok(max_referenced)
    }
}

/// A complete buildable unit: the iterated queue plus the optional
/// post-processing queue behind the `Post:` keyword.
#[derive(Debug, Default)]
pub struct Pipeline {
    pub iterated: Queue,
    pub post: Queue,
}

impl Pipeline {
    /// Resolve `$N` references in both queues. Referencing a variable that
    /// was not supplied is fatal; supplying more than the script references
    /// is only worth a note.
    pub fn apply_variables(
        &mut self,
        values: &[String],
        diag: &dyn Diagnostics,
    ) -> Result<(), BuildError> {
        let a = self.iterated.apply_variables(values)?;
        let b = self.post.apply_variables(values)?;
        let max_referenced = a.max(b);
        if max_referenced > values.len() {
            return Err(BuildError::MissingVariables {
                requested: max_referenced,
                supplied: values.len(),
            });
        }
        if max_referenced < values.len() {
            diag.trace(
                0,
                &format!(
                    "script refers to {} variable(s) but {} were given",
                    max_referenced,
                    values.len()
                ),
            );
        }
        Ok(())
    }
}
