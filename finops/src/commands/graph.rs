// finops/src/commands/graph.rs
//
// USE CASE: Resource dependency graph of one stack.

use std::path::PathBuf;

use finops_core::FinopsError;
use finops_core::application::DependencyReport;

use super::{compose, fail};

pub fn execute(project_dir: PathBuf, stack: String, format: String) -> anyhow::Result<()> {
    let (_, app) = compose(&project_dir).unwrap_or_else(|e| fail("Graph failed", &e));
    let template = app
        .synthesize_stack(&stack)
        .unwrap_or_else(|e| fail("Graph failed", &e));
    let report = DependencyReport::analyze(&template)
        .unwrap_or_else(|e| fail("Graph failed", &FinopsError::from(e)));

    match format.as_str() {
        "json" => println!("{}", report.to_json()?),
        _ => {
            println!("```mermaid");
            println!("{}", report.to_mermaid());
            println!("```\n");
            println!("📊 Graph Summary:");
            println!("   Resources: {}", report.nodes.len());
            println!("   Edges: {}", report.edges.len());
            println!("   Creation layers: {}", report.layers.len());
        }
    }

    Ok(())
}
