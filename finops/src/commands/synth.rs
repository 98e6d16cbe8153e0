// finops/src/commands/synth.rs
//
// USE CASE: Synthesize templates and the assembly manifest.

use std::path::PathBuf;

use finops_core::application::resolve_out_dir;
use finops_core::infrastructure::renderer::OutputFormat;

use super::{compose, fail, warn_open_ingress};

pub fn execute(
    project_dir: PathBuf,
    stack: Option<String>,
    format: OutputFormat,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    println!("⚙️  Loading configuration...");
    let (config, app) = compose(&project_dir).unwrap_or_else(|e| fail("Synthesis aborted", &e));
    println!(
        "   Project: {} (posture: {}, region: {})",
        config.name, config.posture, config.region
    );
    warn_open_ingress(&app);

    let mut assembly = app
        .synthesize()
        .unwrap_or_else(|e| fail("Synthesis aborted", &e));
    if let Some(name) = stack {
        assembly = assembly
            .select(&name)
            .unwrap_or_else(|e| fail("Synthesis aborted", &e));
    }

    let out_dir = match out {
        Some(dir) => dir,
        None => resolve_out_dir(&project_dir, &config.out_dir)
            .unwrap_or_else(|e| fail("Synthesis aborted", &e)),
    };

    let renderer = format.renderer();
    let written = assembly
        .write(&out_dir, renderer.as_ref())
        .unwrap_or_else(|e| fail("Writing the assembly failed", &e));

    for template in &assembly.templates {
        println!(
            "   📦 {} ({} resources, {})",
            template.stack_name,
            template.resources.len(),
            template.region
        );
    }
    for path in &written {
        println!("   📝 {}", path.display());
    }

    println!(
        "\n✨ SUCCESS! {} stack(s) synthesized in {:.2?}",
        assembly.templates.len(),
        start.elapsed()
    );
    Ok(())
}
