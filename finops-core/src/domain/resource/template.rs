// finops-core/src/domain/resource/template.rs

use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::HashSet;

use super::descriptor::ResourceDescriptor;
use crate::domain::error::DomainError;
use crate::domain::graph::GraphSolver;

const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// A plain-string value exposed by a stack for downstream manual wiring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackOutput {
    pub key: String,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The flat, validated descriptor set of one stack.
#[derive(Debug, Clone, Serialize)]
pub struct StackTemplate {
    pub stack_name: String,
    pub region: String,
    pub account: String,
    pub description: String,
    pub resources: Vec<ResourceDescriptor>,
    pub outputs: Vec<StackOutput>,
}

impl StackTemplate {
    pub fn builder(stack_name: &str, account: &str, region: &str) -> StackTemplateBuilder {
        StackTemplateBuilder {
            template: StackTemplate {
                stack_name: stack_name.to_string(),
                region: region.to_string(),
                account: account.to_string(),
                description: String::new(),
                resources: Vec::new(),
                outputs: Vec::new(),
            },
            ids: HashSet::new(),
        }
    }

    pub fn resource(&self, logical_id: &str) -> Option<&ResourceDescriptor> {
        self.resources.iter().find(|r| r.logical_id == logical_id)
    }

    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = &'a ResourceDescriptor> + 'a {
        self.resources
            .iter()
            .filter(move |r| r.resource_type == resource_type)
    }

    pub fn output(&self, key: &str) -> Option<&StackOutput> {
        self.outputs.iter().find(|o| o.key == key)
    }

    /// Creation layers for the external engine (and for `finops graph`).
    pub fn creation_plan(&self) -> Result<Vec<Vec<String>>, DomainError> {
        GraphSolver::plan_creation(&self.resources)
    }

    /// Renders the descriptor set as a CloudFormation document.
    pub fn to_cloudformation(&self) -> Value {
        let mut resources = Map::new();
        for r in &self.resources {
            let mut body = Map::new();
            body.insert("Type".into(), json!(r.resource_type));
            if r.properties.as_object().is_some_and(|p| !p.is_empty()) {
                body.insert("Properties".into(), r.properties.clone());
            }
            if !r.depends_on.is_empty() {
                body.insert("DependsOn".into(), json!(r.depends_on));
            }
            body.insert("DeletionPolicy".into(), json!(r.removal.as_str()));
            body.insert("UpdateReplacePolicy".into(), json!(r.removal.as_str()));
            resources.insert(r.logical_id.clone(), Value::Object(body));
        }

        let mut outputs = Map::new();
        for o in &self.outputs {
            let mut body = Map::new();
            if let Some(desc) = &o.description {
                body.insert("Description".into(), json!(desc));
            }
            body.insert("Value".into(), o.value.clone());
            outputs.insert(o.key.clone(), Value::Object(body));
        }

        json!({
            "AWSTemplateFormatVersion": TEMPLATE_FORMAT_VERSION,
            "Description": self.description,
            "Resources": resources,
            "Outputs": outputs,
        })
    }
}

/// Accumulates immutable descriptors; `build` checks the graph is closed and acyclic.
#[derive(Debug)]
pub struct StackTemplateBuilder {
    template: StackTemplate,
    ids: HashSet<String>,
}

impl StackTemplateBuilder {
    pub fn description(mut self, description: &str) -> Self {
        self.template.description = description.to_string();
        self
    }

    pub fn add(&mut self, resource: ResourceDescriptor) -> Result<&mut Self, DomainError> {
        if !self.ids.insert(resource.logical_id.clone()) {
            return Err(DomainError::DuplicateLogicalId(resource.logical_id));
        }
        tracing::debug!(
            stack = %self.template.stack_name,
            id = %resource.logical_id,
            kind = %resource.resource_type,
            removal = %resource.removal,
            "declared resource"
        );
        self.template.resources.push(resource);
        Ok(self)
    }

    pub fn output(&mut self, key: &str, value: Value, description: Option<&str>) -> &mut Self {
        self.template.outputs.push(StackOutput {
            key: key.to_string(),
            value,
            description: description.map(str::to_string),
        });
        self
    }

    pub fn build(self) -> Result<StackTemplate, DomainError> {
        GraphSolver::plan_creation(&self.template.resources)?;

        for output in &self.template.outputs {
            for target in super::intrinsic::collect_references(&output.value) {
                if !self.ids.contains(&target) {
                    return Err(DomainError::DanglingReference {
                        from: format!("Outputs.{}", output.key),
                        to: target,
                    });
                }
            }
        }

        Ok(self.template)
    }
}
