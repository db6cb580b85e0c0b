use super::descriptor::ArgDescriptor;
use serde::{Deserialize, Serialize};

/// A bound argument payload, tagged to match the descriptor kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArgData {
    Unset,
    /// A Nothing-kind switch that was given
    Flag,
    Int(i64),
    Float(f64),
    Str(String),
    /// Index into the descriptor's choice table
    Choice(usize),
}

/// Binding state of one argument.
///
/// `variable` carries a 1-based `$N` reference; it stays in place after the
/// deferred value has been resolved, so dump and script printing can tell a
/// resolved variable from a literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgValue {
    pub variable: Option<usize>,
    pub data: ArgData,
}

impl ArgValue {
    pub fn unset() -> Self {
        Self {
            variable: None,
            data: ArgData::Unset,
        }
    }

    /// An argument counts as set once it carries data or a deferred `$N`.
    pub fn is_set(&self) -> bool {
        self.variable.is_some() || self.data != ArgData::Unset
    }
}

impl Default for ArgValue {
    fn default() -> Self {
        Self::unset()
    }
}

/// The bound argument list of one method instance, indexed in descriptor
/// order. Method implementations read their configuration from here during
/// `init`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgValues(Vec<ArgValue>);

impl ArgValues {
    pub fn for_descriptors(descriptors: &[ArgDescriptor]) -> Self {
        Self(vec![ArgValue::unset(); descriptors.len()])
    }

    pub fn from_values(values: Vec<ArgValue>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ArgValue> {
        self.0.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ArgValue> {
        self.0.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArgValue> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ArgValue> {
        self.0.iter_mut()
    }

    pub fn is_set(&self, index: usize) -> bool {
        self.0.get(index).map(ArgValue::is_set).unwrap_or(false)
    }

    pub fn int(&self, index: usize) -> Option<i64> {
        match self.0.get(index)?.data {
            ArgData::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn int_or(&self, index: usize, default: i64) -> i64 {
        self.int(index).unwrap_or(default)
    }

    pub fn float(&self, index: usize) -> Option<f64> {
        match self.0.get(index)?.data {
            ArgData::Float(f) => Some(f),
            _ => None,
        }
    }

    pub fn float_or(&self, index: usize, default: f64) -> f64 {
        self.float(index).unwrap_or(default)
    }

    pub fn string(&self, index: usize) -> Option<&str> {
        match &self.0.get(index)?.data {
            ArgData::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn choice(&self, index: usize) -> Option<usize> {
        match self.0.get(index)?.data {
            ArgData::Choice(c) => Some(c),
            _ => None,
        }
    }
}
