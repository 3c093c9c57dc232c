//! Declarative live-value sinks (CSS custom properties on the web, a log or
//! an in-memory table elsewhere).

use fnv::FnvHashMap;
use smallvec::SmallVec;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum VariableValue {
    Scalar(f32),
    Vector(SmallVec<[f32; 4]>),
}

impl VariableValue {
    pub fn vector(values: &[f32]) -> Self {
        Self::Vector(SmallVec::from_slice(values))
    }

    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Self::Scalar(v) => Some(*v),
            Self::Vector(_) => None,
        }
    }

    /// True when every component differs by less than `eps`.
    pub fn close_to(&self, other: &Self, eps: f32) -> bool {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => (a - b).abs() < eps,
            (Self::Vector(a), Self::Vector(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < eps)
            }
            _ => false,
        }
    }
}

impl From<f32> for VariableValue {
    fn from(v: f32) -> Self {
        Self::Scalar(v)
    }
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => write!(f, "{:.4}", v),
            Self::Vector(vs) => {
                for (i, v) in vs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:.4}", v)?;
                }
                Ok(())
            }
        }
    }
}

/// Receiver of named live values. The bridge is the only writer.
pub trait VariableSink {
    fn set(&mut self, name: &str, value: &VariableValue);

    /// Element-scoped value for one registered layer.
    fn set_layer(&mut self, layer: &str, name: &str, value: &VariableValue) {
        self.set(&format!("{layer}.{name}"), value);
    }
}

/// In-memory sink that keeps the latest value per name and a write count.
#[derive(Debug, Default)]
pub struct MemorySink {
    values: FnvHashMap<String, VariableValue>,
    writes: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&VariableValue> {
        self.values.get(name)
    }

    pub fn scalar(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(VariableValue::as_scalar)
    }

    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl VariableSink for MemorySink {
    fn set(&mut self, name: &str, value: &VariableValue) {
        self.writes += 1;
        self.values.insert(name.to_string(), value.clone());
    }
}
