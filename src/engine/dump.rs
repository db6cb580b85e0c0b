use crate::args::{ArgData, ArgKind, ArgValue, ArgValues};
use crate::engine::queue::{MethodInstance, Pipeline, Queue};
use crate::error::BuildError;
use crate::registry::MethodRegistry;

use serde::{Deserialize, Serialize};

/// Serializable image of one method instance: everything needed to rebuild
/// it against a registry, nothing of its run-time state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceDump {
    pub name: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub branch: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub epoch_override: bool,
    pub script: u32,
    pub line: u32,
    pub arguments: Vec<ArgValue>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueueDump {
    pub methods: Vec<InstanceDump>,
}

/// Portable image of a whole pipeline. Reloading re-resolves every method
/// name against the target registry and re-runs the shape checks, so a dump
/// is no license to bypass them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDump {
    pub iterated: QueueDump,
    pub post: QueueDump,
}

impl PipelineDump {
    pub fn from_pipeline(pipeline: &Pipeline) -> Self {
        Self {
            iterated: dump_queue(&pipeline.iterated),
            post: dump_queue(&pipeline.post),
        }
    }

    pub fn reload(&self, registry: &MethodRegistry) -> Result<Pipeline, BuildError> {
        let pipeline = Pipeline {
            iterated: reload_queue(&self.iterated, registry, true)?,
            post: reload_queue(&self.post, registry, false)?,
        };
        if let Some(first) = self.iterated.methods.first() {
            pipeline.iterated.check_closed(first.script)?;
        }
        Ok(pipeline)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

impl Pipeline {
    pub fn dump(&self) -> PipelineDump {
        PipelineDump::from_pipeline(self)
    }
}

fn dump_queue(queue: &Queue) -> QueueDump {
    QueueDump {
        methods: queue
            .instances
            .iter()
            .map(|instance| InstanceDump {
                name: instance.name().to_string(),
                branch: instance.branch,
                epoch_override: instance.epoch_override,
                script: instance.script,
                line: instance.line,
                arguments: instance.args.iter().cloned().collect(),
            })
            .collect(),
    }
}

fn reload_queue(
    dump: &QueueDump,
    registry: &MethodRegistry,
    is_iterated: bool,
) -> Result<Queue, BuildError> {
    let mut queue = Queue::default();
    for m in &dump.methods {
        let descriptor = registry
            .lookup(&m.name)
            .ok_or_else(|| BuildError::UnknownMethod {
                name: m.name.clone(),
                script: m.script,
                line: m.line,
            })?;
        if m.arguments.len() != descriptor.arguments.len() {
            return Err(BuildError::DumpMismatch {
                name: m.name.clone(),
                message: format!(
                    "method takes {} argument(s), dump carries {}",
                    descriptor.arguments.len(),
                    m.arguments.len()
                ),
            });
        }
        for (value, desc) in m.arguments.iter().zip(&descriptor.arguments) {
            if !data_matches(desc.kind, &value.data, desc.choices.len()) {
                return Err(BuildError::DumpMismatch {
                    name: m.name.clone(),
                    message: format!(
                        "dumped value {:?} does not fit a {} argument",
                        value.data,
                        desc.kind.name()
                    ),
                });
            }
        }
        let instance = MethodInstance::new(
            descriptor,
            ArgValues::from_values(m.arguments.clone()),
            m.branch,
            m.epoch_override,
            m.script,
            m.line,
        );
        queue.push_checked(instance, is_iterated)?;
    }
    Ok(queue)
}

fn data_matches(kind: ArgKind, data: &ArgData, nr_of_choices: usize) -> bool {
    match (kind, data) {
        (_, ArgData::Unset) => true,
        (ArgKind::Nothing, ArgData::Flag) => true,
        (ArgKind::Integer, ArgData::Int(_)) => true,
        (ArgKind::Float, ArgData::Float(_)) => true,
        (ArgKind::Word | ArgKind::Sentence | ArgKind::Filename, ArgData::Str(_)) => true,
        (ArgKind::Selection, ArgData::Choice(c)) => *c < nr_of_choices,
        _ => false,
    }
}
