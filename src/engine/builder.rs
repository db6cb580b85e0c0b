use crate::args::{bind, ArgCursor, ArgDescriptor, ArgMarker, ArgValues, BindOutcome};
use crate::engine::queue::{MethodInstance, Pipeline};
use crate::error::BuildError;
use crate::registry::{MethodDescriptor, MethodRegistry};
use std::sync::Arc;

/// Compiles script text into pipelines against one registry.
///
/// The builder keeps running script and line counters so diagnostics from a
/// multi-script text point at the right place; one builder should be used
/// per script text.
pub struct QueueBuilder<'r> {
    registry: &'r MethodRegistry,
    script_number: u32,
    line_number: u32,
}

impl<'r> QueueBuilder<'r> {
    pub fn new(registry: &'r MethodRegistry) -> Self {
        Self {
            registry,
            script_number: 0,
            line_number: 0,
        }
    }

    /// Build a single pipeline. Reading stops at the first sub-script
    /// separator line (leading `-`); anything after it is ignored.
    pub fn build(&mut self, script: &str) -> Result<Pipeline, BuildError> {
        self.script_number += 1;
        let mut pipeline = Pipeline::default();
        let mut in_post = false;
        let body = script.strip_suffix('\n').unwrap_or(script);
        if !body.is_empty() {
            for raw_line in body.split('\n') {
                if raw_line.starts_with('-') {
                    break;
                }
                self.line_number += 1;
                self.process_line(raw_line, &mut pipeline, &mut in_post)?;
            }
        }
        // account for the separator line between sub-scripts
        self.line_number += 1;
        pipeline.iterated.check_closed(self.script_number)?;
        Ok(pipeline)
    }

    /// Build every sub-script in the text, separated by lines starting with
    /// `-`. Empty sub-scripts are skipped.
    pub fn build_all(&mut self, text: &str) -> Result<Vec<Pipeline>, BuildError> {
        let mut segments: Vec<String> = vec![String::new()];
        for line in text.split('\n') {
            if line.starts_with('-') {
                segments.push(String::new());
            } else {
                let segment = segments.last_mut().expect("segments is never empty");
                segment.push_str(line);
                segment.push('\n');
            }
        }
        let mut pipelines = Vec::new();
        for segment in &segments {
            let pipeline = self.build(segment)?;
            if !pipeline.iterated.is_empty() || !pipeline.post.is_empty() {
                pipelines.push(pipeline);
            }
        }
        Ok(pipelines)
    }

    fn process_line(
        &mut self,
        raw: &str,
        pipeline: &mut Pipeline,
        in_post: &mut bool,
    ) -> Result<(), BuildError> {
        let line = strip_comment(raw);

        let mut branch = false;
        let mut epoch_override = false;
        let mut text = line.trim_start();
        loop {
            if let Some(rest) = text.strip_prefix('>') {
                branch = true;
                text = rest.trim_start();
            } else if let Some(rest) = text.strip_prefix('!') {
                epoch_override = true;
                text = rest.trim_start();
            } else {
                break;
            }
        }

        let mut cursor = ArgCursor::new(text);
        let Some(name) = cursor.token().map(str::to_string) else {
            return Ok(());
        };

        if name == "Post:" {
            if *in_post {
                return Err(BuildError::DuplicatePost {
                    script: self.script_number,
                    line: self.line_number,
                });
            }
            *in_post = true;
            return Ok(());
        }

        let descriptor =
            self.registry
                .lookup(&name)
                .ok_or_else(|| BuildError::UnknownMethod {
                    name: name.clone(),
                    script: self.script_number,
                    line: self.line_number,
                })?;
        cursor.advance();
        let args = self.bind_arguments(&descriptor, &mut cursor)?;
        let instance = MethodInstance::new(
            descriptor,
            args,
            branch,
            epoch_override,
            self.script_number,
            self.line_number,
        );
        if *in_post {
            pipeline.post.push_checked(instance, false)
        } else {
            pipeline.iterated.push_checked(instance, true)
        }
    }

    /// Two-phase binding: first scan the optional prefix of the descriptor
    /// list against the token stream until nothing matches or `--` ends the
    /// options, then walk the positional arguments in declared order.
    fn bind_arguments(
        &self,
        descriptor: &Arc<MethodDescriptor>,
        cursor: &mut ArgCursor,
    ) -> Result<ArgValues, BuildError> {
        let descs = &descriptor.arguments;
        let mut values = ArgValues::for_descriptors(descs);

        'scan: while cursor.has_token() {
            if cursor.token() == Some("--") {
                cursor.advance();
                break;
            }
            let mut index = 0;
            while index < descs.len() {
                match &descs[index].marker {
                    // the optional prefix ends at the first required argument
                    ArgMarker::Required => break,
                    ArgMarker::Switch(letters) => {
                        let matched = cursor
                            .token()
                            .and_then(|t| t.strip_prefix('-'))
                            .is_some_and(|t| t == letters.as_str());
                        if matched && !values.is_set(index) {
                            cursor.advance();
                            let slot = values.get_mut(index).ok_or_else(|| {
                                self.syntax_error(descriptor, "argument table out of range")
                            })?;
                            match bind(&descs[index], slot, cursor) {
                                BindOutcome::Bound => continue 'scan,
                                _ => {
                                    return Err(BuildError::OptionError {
                                        method: descriptor.name.clone(),
                                        option: letters.clone(),
                                        script: self.script_number,
                                        line: self.line_number,
                                    })
                                }
                            }
                        }
                        index += 1;
                    }
                    ArgMarker::OptionalPositional { companions } => {
                        let companions = *companions;
                        let slot = values.get_mut(index).ok_or_else(|| {
                            self.syntax_error(descriptor, "argument table out of range")
                        })?;
                        match bind(&descs[index], slot, cursor) {
                            BindOutcome::Bound => {
                                self.bind_companions(descriptor, index, companions, &mut values, cursor)?;
                                continue 'scan;
                            }
                            BindOutcome::NotFound => index += companions + 1,
                            BindOutcome::Syntax(message) => {
                                return Err(self.syntax_error(descriptor, &message))
                            }
                        }
                    }
                }
            }
            break;
        }

        // positional walk: the optional prefix was handled above, switches
        // never bind positionally
        let mut index = descs
            .iter()
            .position(ArgDescriptor::is_required)
            .unwrap_or(descs.len());
        while cursor.has_token() && index < descs.len() {
            if matches!(descs[index].marker, ArgMarker::Switch(_)) {
                index += 1;
                continue;
            }
            let slot = values
                .get_mut(index)
                .ok_or_else(|| self.syntax_error(descriptor, "argument table out of range"))?;
            match bind(&descs[index], slot, cursor) {
                BindOutcome::Bound => {}
                BindOutcome::NotFound => {
                    // a token that a required argument cannot use is fatal
                    // right here, naming the argument
                    if descs[index].is_required() {
                        return Err(BuildError::MissingArgument {
                            method: descriptor.name.clone(),
                            description: descs[index].description.clone(),
                            script: self.script_number,
                            line: self.line_number,
                        });
                    }
                }
                BindOutcome::Syntax(message) => {
                    return Err(self.syntax_error(descriptor, &message))
                }
            }
            index += 1;
        }

        if cursor.has_token() {
            return Err(BuildError::TooManyArguments {
                method: descriptor.name.clone(),
                script: self.script_number,
                line: self.line_number,
            });
        }
        for (index, desc) in descs.iter().enumerate() {
            if desc.is_required() && !values.is_set(index) {
                return Err(BuildError::MissingArgument {
                    method: descriptor.name.clone(),
                    description: desc.description.clone(),
                    script: self.script_number,
                    line: self.line_number,
                });
            }
        }
        Ok(values)
    }

    /// Once an optional-positional argument binds, its companions are no
    /// longer optional.
    fn bind_companions(
        &self,
        descriptor: &Arc<MethodDescriptor>,
        lead: usize,
        companions: usize,
        values: &mut ArgValues,
        cursor: &mut ArgCursor,
    ) -> Result<(), BuildError> {
        for offset in 1..=companions {
            let index = lead + offset;
            let desc: &ArgDescriptor = descriptor.arguments.get(index).ok_or_else(|| {
                self.syntax_error(descriptor, "companion beyond the argument table")
            })?;
            let slot = values
                .get_mut(index)
                .ok_or_else(|| self.syntax_error(descriptor, "argument table out of range"))?;
            match bind(desc, slot, cursor) {
                BindOutcome::Bound => {}
                BindOutcome::NotFound => {
                    return Err(BuildError::MissingCompanion {
                        method: descriptor.name.clone(),
                        description: desc.description.clone(),
                        script: self.script_number,
                        line: self.line_number,
                    })
                }
                BindOutcome::Syntax(message) => {
                    return Err(self.syntax_error(descriptor, &message))
                }
            }
        }
        Ok(())
    }

    fn syntax_error(&self, descriptor: &MethodDescriptor, message: &str) -> BuildError {
        BuildError::Syntax {
            method: descriptor.name.clone(),
            message: message.to_string(),
            script: self.script_number,
            line: self.line_number,
        }
    }
}

/// Cut the line at the first unprotected `#`.
fn strip_comment(line: &str) -> &str {
    let mut protected = false;
    for (i, c) in line.char_indices() {
        match c {
            '\\' => protected = !protected,
            '#' if !protected => return &line[..i],
            _ => protected = false,
        }
    }
    line
}
