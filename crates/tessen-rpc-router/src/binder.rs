//! Parameter binding.
//!
//! Binding runs after a definition has matched. Named captures come out of
//! the concrete method, registered defaults fill anything missing, and
//! parameters still null after defaulting are dropped. Results live in a
//! per-dispatch [`BoundParameters`] scope, never on the shared definition,
//! so concurrent dispatches against one definition cannot observe each
//! other's bindings.

use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

use crate::definition::ProcedureDefinition;
use crate::pattern::PatternError;

/// Faults raised during binding. A `NoMatch` here means the matcher admitted
/// a method the compiled pattern cannot actually capture, unreachable in
/// normal operation and classified as an internal fault by the dispatcher.
#[derive(Debug, Error)]
pub enum BindError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("method '{method}' does not bind against pattern '{pattern}'")]
    NoMatch { method: String, pattern: String },
}

/// Named parameters bound for a single dispatch.
#[derive(Debug, Clone, Default)]
pub struct BoundParameters {
    values: HashMap<String, Value>,
}

impl BoundParameters {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Final call arguments: handlers never receive an explicit null for a
    /// parameter they didn't bind.
    pub fn without_nulls(&self) -> HashMap<String, Value> {
        self.values
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

/// Bind the concrete method against a matched definition.
pub fn bind(
    definition: &ProcedureDefinition,
    method: &str,
) -> Result<BoundParameters, BindError> {
    let compiled = definition.compiled()?;

    if !compiled.matches(method) {
        return Err(BindError::NoMatch {
            method: method.to_string(),
            pattern: compiled.pattern().to_string(),
        });
    }

    let mut values: HashMap<String, Value> = compiled
        .extract(method)
        .into_iter()
        .map(|(name, value)| (name, Value::String(value)))
        .collect();

    for (name, default) in definition.defaults() {
        if !values.contains_key(name) {
            values.insert(name.clone(), default.clone());
        }
    }

    // Missing optionals without a default simply stay absent.
    values.retain(|_, value| !value.is_null());

    Ok(BoundParameters { values })
}
