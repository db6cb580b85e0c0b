use serde::{Deserialize, Serialize};

/// The argument kinds a method can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArgKind {
    Nothing,
    Integer,
    Float,
    Word,
    Sentence,
    Filename,
    Selection,
}

impl ArgKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nothing => "nothing",
            Self::Integer => "integer",
            Self::Float => "floating point",
            Self::Word => "string word",
            Self::Sentence => "sentence",
            Self::Filename => "filename",
            Self::Selection => "selection",
        }
    }
}

/// How an argument is located on the script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgMarker {
    /// Consumed positionally in declared order; failing to bind is fatal
    Required,
    /// Matched against a leading `-<letters>` token, order-independent
    Switch(String),
    /// No switch, but optional; may require trailing companion arguments
    OptionalPositional { companions: usize },
}

/// Immutable schema for one argument of a method.
#[derive(Debug, Clone)]
pub struct ArgDescriptor {
    pub kind: ArgKind,
    pub description: String,
    pub marker: ArgMarker,
    pub default_value: f64,
    /// Fixed ordered choice table, only meaningful for Selection
    pub choices: Vec<String>,
}

impl ArgDescriptor {
    pub fn required(kind: ArgKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            marker: ArgMarker::Required,
            default_value: 0.0,
            choices: Vec::new(),
        }
    }

    pub fn switch(letters: impl Into<String>, kind: ArgKind, description: impl Into<String>) -> Self {
        Self {
            marker: ArgMarker::Switch(letters.into()),
            ..Self::required(kind, description)
        }
    }

    pub fn optional(kind: ArgKind, description: impl Into<String>) -> Self {
        Self {
            marker: ArgMarker::OptionalPositional { companions: 0 },
            ..Self::required(kind, description)
        }
    }

    /// Number of descriptors immediately following this one that must bind
    /// whenever this optional-positional argument binds.
    pub fn with_companions(mut self, companions: usize) -> Self {
        self.marker = ArgMarker::OptionalPositional { companions };
        self
    }

    pub fn with_default(mut self, value: f64) -> Self {
        self.default_value = value;
        self
    }

    pub fn with_choices(mut self, choices: &[&str]) -> Self {
        self.choices = choices.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn is_required(&self) -> bool {
        self.marker == ArgMarker::Required
    }

    pub fn is_optional(&self) -> bool {
        !self.is_required()
    }
}
