use crate::args::ArgDescriptor;
use crate::core::{Method, MethodKind};

/// Factory function type for creating method state instances
pub type MethodFactory = fn() -> Box<dyn Method>;

/// Complete, immutable description of one registrable method: its name, its
/// capability kind, its argument schema and the factory for per-instance
/// state. Owned by the hosting program; the engine only reads it.
#[derive(Clone)]
pub struct MethodDescriptor {
    pub name: String,
    pub kind: MethodKind,
    pub description: String,
    pub arguments: Vec<ArgDescriptor>,
    pub factory: MethodFactory,
}

impl MethodDescriptor {
    pub fn new(
        name: impl Into<String>,
        kind: MethodKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            arguments: Vec::new(),
            factory: || panic!("No factory set"),
        }
    }

    pub fn with_factory(mut self, factory: MethodFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Argument order is binding order: optional arguments first, required
    /// arguments after them in their positional order.
    pub fn add_argument(mut self, descriptor: ArgDescriptor) -> Self {
        self.arguments.push(descriptor);
        self
    }

    /// Create the per-instance state object for this method type
    pub fn create_instance(&self) -> Box<dyn Method> {
        (self.factory)()
    }
}

// Factory type for creating method descriptors at registration time
pub type MethodDescriptorFactory = fn() -> MethodDescriptor;

// Wrapper for inventory collection
pub struct MethodDescriptorFactoryWrapper(pub MethodDescriptorFactory);

// Inventory submission type
inventory::collect!(MethodDescriptorFactoryWrapper);
