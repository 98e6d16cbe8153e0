// finops/src/commands/validate.rs
//
// USE CASE: Check every invariant without writing anything.

use std::path::PathBuf;

use super::{compose, fail, warn_open_ingress};

pub fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    println!("🛡️  Validating project...");

    let (config, app) = compose(&project_dir).unwrap_or_else(|e| fail("Validation failed", &e));
    let assembly = app
        .synthesize()
        .unwrap_or_else(|e| fail("Validation failed", &e));

    println!("   Project: {} (posture: {})", config.name, config.posture);
    for template in &assembly.templates {
        println!(
            "   ✅ {}: {} resources, {} outputs",
            template.stack_name,
            template.resources.len(),
            template.outputs.len()
        );
    }
    warn_open_ingress(&app);

    println!("\n✨ All invariants hold.");
    Ok(())
}
