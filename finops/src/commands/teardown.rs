// finops/src/commands/teardown.rs
//
// USE CASE: What deleting a stack destroys and what it leaves behind.

use std::path::PathBuf;

use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;
use finops_core::FinopsError;
use finops_core::application::TeardownPlan;

use super::{compose, fail};

pub fn execute(project_dir: PathBuf, stack: String) -> anyhow::Result<()> {
    let (_, app) = compose(&project_dir).unwrap_or_else(|e| fail("Teardown plan failed", &e));
    let template = app
        .synthesize_stack(&stack)
        .unwrap_or_else(|e| fail("Teardown plan failed", &e));
    let plan = TeardownPlan::for_template(&template)
        .unwrap_or_else(|e| fail("Teardown plan failed", &FinopsError::from(e)));

    println!("🧨 Deleting stack '{}'", plan.stack_name);

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Order", "Logical id", "Type", "On delete"]);
    for (i, entry) in plan.destroyed.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            entry.logical_id.clone(),
            entry.resource_type.clone(),
            "DESTROY".to_string(),
        ]);
    }
    for entry in &plan.retained {
        table.add_row(vec![
            "-".to_string(),
            entry.logical_id.clone(),
            entry.resource_type.clone(),
            "RETAIN".to_string(),
        ]);
    }
    println!("{table}");

    if !plan.retained.is_empty() {
        println!(
            "   🔒 {} resource(s) survive deletion and must be removed by hand.",
            plan.retained.len()
        );
    }
    Ok(())
}
