// finops-core/src/application/graph.rs
//
// Resource dependency report for one stack: who references whom, and the
// layers a provisioning engine can create in parallel.

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::resource::StackTemplate;

#[derive(Debug, Serialize, Deserialize)]
pub struct DependencyReport {
    pub stack_name: String,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    /// Creation layers, first to last.
    pub layers: Vec<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GraphNode {
    pub logical_id: String,
    pub resource_type: String,
    pub retained: bool,
}

/// `to` cannot be created before `from`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
}

impl DependencyReport {
    pub fn analyze(template: &StackTemplate) -> Result<Self, DomainError> {
        let layers = template.creation_plan()?;

        let nodes = template
            .resources
            .iter()
            .map(|r| GraphNode {
                logical_id: r.logical_id.clone(),
                resource_type: r.resource_type.clone(),
                retained: r.removal.is_retained(),
            })
            .collect();

        let edges = template
            .resources
            .iter()
            .flat_map(|r| {
                r.references().into_iter().map(move |dep| GraphEdge {
                    from: dep,
                    to: r.logical_id.clone(),
                })
            })
            .collect();

        Ok(Self {
            stack_name: template.stack_name.clone(),
            nodes,
            edges,
            layers,
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_mermaid(&self) -> String {
        let mut lines = Vec::new();
        lines.push("graph LR".to_string());

        for node in &self.nodes {
            let short_type = node
                .resource_type
                .rsplit("::")
                .next()
                .unwrap_or(&node.resource_type);
            if node.retained {
                lines.push(format!(
                    "    {}[\"🔒 {} ({})\"]",
                    node.logical_id, node.logical_id, short_type
                ));
            } else {
                lines.push(format!(
                    "    {}[\"{} ({})\"]",
                    node.logical_id, node.logical_id, short_type
                ));
            }
        }

        for edge in &self.edges {
            lines.push(format!("    {} --> {}", edge.from, edge.to));
        }

        for node in self.nodes.iter().filter(|n| n.retained) {
            lines.push(format!("    style {} fill:#f9e79f,stroke:#b7950b", node.logical_id));
        }

        lines.join("\n")
    }
}
