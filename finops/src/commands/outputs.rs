// finops/src/commands/outputs.rs
//
// USE CASE: The outputs surface other stacks and operators consume.

use std::path::PathBuf;

use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;

use super::{compose, fail};

pub fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    let (_, app) = compose(&project_dir).unwrap_or_else(|e| fail("Outputs failed", &e));
    let assembly = app
        .synthesize()
        .unwrap_or_else(|e| fail("Outputs failed", &e));

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Stack", "Output", "Value", "Description"]);
    for output in assembly.outputs() {
        let value = match output.value.as_str() {
            Some(literal) => literal.to_string(),
            None => output.value.to_string(),
        };
        table.add_row(vec![
            output.stack,
            output.key,
            value,
            output.description.unwrap_or_default(),
        ]);
    }
    println!("{table}");
    Ok(())
}
