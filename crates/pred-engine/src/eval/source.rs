use std::collections::HashMap;

use pred_types::{Value, VarSnapshot};

/// Host-side buffers the evaluator reads var values from.
///
/// `values` returns every value seen so far for `name`; successive calls
/// within a transaction must only ever return longer (or equal) lists with
/// the same prefix.
pub trait VarSource {
    fn values(&self, name: &str) -> &[Value];

    /// True once no further values will arrive for `name`.
    fn is_finished(&self, name: &str) -> bool;
}

#[derive(Debug, Clone, Default)]
struct Buffer {
    values: Vec<Value>,
    finished: bool,
}

/// In-memory [`VarSource`] driven by the caller between phases.
#[derive(Debug, Clone, Default)]
pub struct MemoryVarSource {
    vars: HashMap<String, Buffer>,
}

impl MemoryVarSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.buffer(name).values.push(value.into());
        self
    }

    pub fn extend(&mut self, name: &str, values: impl IntoIterator<Item = Value>) -> &mut Self {
        self.buffer(name).values.extend(values);
        self
    }

    pub fn finish(&mut self, name: &str) -> &mut Self {
        self.buffer(name).finished = true;
        self
    }

    /// Applies a cumulative snapshot; values already present are kept.
    pub fn apply(&mut self, name: &str, snapshot: &VarSnapshot) -> &mut Self {
        let buffer = self.buffer(name);
        if snapshot.values.len() > buffer.values.len() {
            let start = buffer.values.len();
            buffer.values.extend_from_slice(&snapshot.values[start..]);
        }
        buffer.finished |= snapshot.finished;
        self
    }

    fn buffer(&mut self, name: &str) -> &mut Buffer {
        self.vars.entry(name.to_string()).or_default()
    }
}

impl VarSource for MemoryVarSource {
    fn values(&self, name: &str) -> &[Value] {
        self.vars
            .get(name)
            .map(|buffer| buffer.values.as_slice())
            .unwrap_or(&[])
    }

    fn is_finished(&self, name: &str) -> bool {
        self.vars.get(name).is_some_and(|buffer| buffer.finished)
    }
}
