// finops/src/commands/clean.rs
//
// USE CASE: Remove the synthesized assembly.

use std::path::PathBuf;

use finops_core::application::clean_project;

use super::fail;

pub fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    match clean_project(&project_dir) {
        Ok(Some(_)) => println!("✨ Clean complete."),
        Ok(None) => println!("   Nothing to clean."),
        Err(e) => fail("Clean failed", &e),
    }
    Ok(())
}
