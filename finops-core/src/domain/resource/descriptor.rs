// finops-core/src/domain/resource/descriptor.rs

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::intrinsic::collect_references;
use super::removal::RemovalPolicy;

/// One declared cloud resource. Immutable once added to a template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceDescriptor {
    pub logical_id: String,
    pub resource_type: String,
    pub properties: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    pub removal: RemovalPolicy,
}

impl ResourceDescriptor {
    pub fn new(logical_id: &str, resource_type: &str, removal: RemovalPolicy) -> Self {
        Self {
            logical_id: logical_id.to_string(),
            resource_type: resource_type.to_string(),
            properties: Value::Object(Map::new()),
            depends_on: Vec::new(),
            removal,
        }
    }

    pub fn with_properties(mut self, properties: Value) -> Self {
        self.properties = properties;
        self
    }

    /// Explicit ordering edge for dependencies that no property expresses.
    pub fn depends_on(mut self, logical_id: &str) -> Self {
        if !self.depends_on.iter().any(|d| d == logical_id) {
            self.depends_on.push(logical_id.to_string());
        }
        self
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Every resource this one needs to exist first.
    pub fn references(&self) -> BTreeSet<String> {
        let mut refs = collect_references(&self.properties);
        refs.extend(self.depends_on.iter().cloned());
        refs.remove(&self.logical_id);
        refs
    }
}
