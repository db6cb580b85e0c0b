//! Method registry: the host-owned table of installable methods.
//!
//! Methods announce themselves through `inventory`; a registry built with
//! [`MethodRegistry::with_builtins`] picks them all up. Hosts can also
//! register additional descriptors by hand.

pub mod metadata;

pub use metadata::{
    MethodDescriptor, MethodDescriptorFactory, MethodDescriptorFactoryWrapper, MethodFactory,
};

use crate::args::ArgMarker;
use std::fmt::Write as _;
use std::sync::Arc;

/// Ordered collection of method descriptors. Lookup is by exact name; there
/// is no prefix or fuzzy matching, a script must spell the method out.
#[derive(Default)]
pub struct MethodRegistry {
    methods: Vec<Arc<MethodDescriptor>>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with every method submitted through `inventory`,
    /// sorted by name so listings are stable across builds.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for wrapper in inventory::iter::<MethodDescriptorFactoryWrapper> {
            registry.register((wrapper.0)());
        }
        registry.methods.sort_by(|a, b| a.name.cmp(&b.name));
        registry
    }

    /// Later registrations with the same name shadow earlier ones.
    pub fn register(&mut self, descriptor: MethodDescriptor) {
        self.methods.retain(|m| m.name != descriptor.name);
        self.methods.push(Arc::new(descriptor));
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<MethodDescriptor>> {
        self.methods.iter().find(|m| m.name == name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.methods.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// One-line-per-method overview of the whole registry.
    pub fn list(&self) -> String {
        let mut out = String::new();
        for m in &self.methods {
            let _ = writeln!(out, "{} ({}): {}", m.name, m.kind.name(), m.description);
        }
        out
    }

    /// Full help text for one method: kind, description and the argument
    /// schema in binding order.
    pub fn describe(&self, name: &str) -> Option<String> {
        let m = self.lookup(name)?;
        let mut out = String::new();
        let _ = writeln!(out, "Method {} ({}):", m.name, m.kind.name());
        let _ = writeln!(out, " {}", m.description);
        if !m.arguments.is_empty() {
            let _ = writeln!(out, "Arguments:");
            for arg in &m.arguments {
                let tag = match &arg.marker {
                    ArgMarker::Required => String::new(),
                    ArgMarker::Switch(letters) => format!("-{letters} "),
                    ArgMarker::OptionalPositional { .. } => "[optional] ".to_string(),
                };
                if arg.choices.is_empty() {
                    let _ = writeln!(out, " {}{} ({})", tag, arg.description, arg.kind.name());
                } else {
                    let _ = writeln!(
                        out,
                        " {}{} ({}: {})",
                        tag,
                        arg.description,
                        arg.kind.name(),
                        arg.choices.join("|")
                    );
                }
            }
        }
        Some(out)
    }
}
