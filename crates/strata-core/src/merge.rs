//! Deterministic merge of a resolution chain.
//!
//! - Mappings: deep-merge by key
//! - Sequences: REPLACE (later wins entirely, no concatenation)
//! - Scalars and null: later wins

use crate::types::{PatternDescriptor, PatternType};
use serde::Serialize;
use serde_yaml::{Mapping, Value};

/// The merged configuration for one requested pattern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConfig {
    pub name: String,
    pub pattern_type: PatternType,
    pub value: Value,
}

impl ResolvedConfig {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.value.get(key)
    }
}

/// Deep merge two values; `overlay` wins on every conflict.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            Value::Mapping(merge_mappings(base_map, overlay_map))
        }
        // Sequences, scalars, tagged values and type changes: overlay wins
        (_, overlay) => overlay,
    }
}

fn merge_mappings(mut base: Mapping, overlay: Mapping) -> Mapping {
    for (key, overlay_value) in overlay {
        let merged = match base.get_mut(&key) {
            Some(slot) => deep_merge(std::mem::take(slot), overlay_value),
            None => overlay_value,
        };
        // Existing keys keep their position; new keys are appended.
        base.insert(key, merged);
    }
    base
}

/// Fold values left to right, last has highest precedence.
pub fn merge_values(layers: Vec<Value>) -> Value {
    layers
        .into_iter()
        .fold(Value::Mapping(Mapping::new()), deep_merge)
}

/// Merge a dependencies-first chain. The last descriptor names the result;
/// an empty chain has nothing to name it and yields `None`.
///
/// Descriptors are cloned, never modified.
pub fn merge(chain: &[PatternDescriptor]) -> Option<ResolvedConfig> {
    let last = chain.last()?;
    Some(merge_as(&last.name, last.pattern_type, chain))
}

/// Merge `chain` under a caller-supplied name and type.
pub fn merge_as(name: &str, pattern_type: PatternType, chain: &[PatternDescriptor]) -> ResolvedConfig {
    let value = merge_values(chain.iter().map(|d| d.document.clone()).collect());
    ResolvedConfig {
        name: name.to_string(),
        pattern_type,
        value,
    }
}
