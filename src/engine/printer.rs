use crate::args::{ArgData, ArgDescriptor, ArgKind, ArgMarker, ArgValue};
use crate::engine::queue::{Pipeline, Queue};

use std::fmt::Write as _;

/// Regenerate runnable script text from a built pipeline.
///
/// Arguments that came in through a `$N` variable are printed as `$N` again,
/// resolved or not; word and filename values get their delimiters and
/// protectors re-escaped so the output tokenizes back to the same values.
pub fn format_script(pipeline: &Pipeline) -> String {
    let mut out = String::new();
    format_queue(&pipeline.iterated, &mut out);
    if !pipeline.post.is_empty() {
        out.push_str("Post:\n");
        format_queue(&pipeline.post, &mut out);
    }
    out
}

fn format_queue(queue: &Queue, out: &mut String) {
    for instance in &queue.instances {
        if instance.branch {
            out.push('>');
        }
        if instance.epoch_override {
            out.push('!');
        }
        out.push_str(instance.name());
        for (index, value) in instance.args.iter().enumerate() {
            if let Some(desc) = instance.descriptor.arguments.get(index) {
                format_argument(desc, value, out);
            }
        }
        out.push('\n');
    }
}

fn format_argument(desc: &ArgDescriptor, value: &ArgValue, out: &mut String) {
    if !value.is_set() {
        return;
    }
    if let ArgMarker::Switch(letters) = &desc.marker {
        let _ = write!(out, " -{letters}");
        if desc.kind == ArgKind::Nothing {
            return;
        }
    }
    if let Some(n) = value.variable {
        let _ = write!(out, " ${n}");
        return;
    }
    match &value.data {
        ArgData::Unset | ArgData::Flag => {}
        ArgData::Int(i) => {
            let _ = write!(out, " {i}");
        }
        ArgData::Float(f) => {
            let _ = write!(out, " {f}");
        }
        ArgData::Str(s) => match desc.kind {
            ArgKind::Word | ArgKind::Filename => {
                let _ = write!(out, " {}", escaped(s));
            }
            _ => {
                let _ = write!(out, " {s}");
            }
        },
        ArgData::Choice(i) => {
            if let Some(choice) = desc.choices.get(*i) {
                let _ = write!(out, " {choice}");
            }
        }
    }
}

/// Protect whitespace, the protector itself and the comment character so the
/// token survives re-tokenization.
fn escaped(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    for c in token.chars() {
        if c.is_ascii_whitespace() || c == '\\' || c == '#' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
