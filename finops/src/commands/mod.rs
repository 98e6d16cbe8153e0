// finops/src/commands/mod.rs

pub mod clean;
pub mod graph;
pub mod outputs;
pub mod synth;
pub mod teardown;
pub mod validate;

use std::path::Path;

use finops_core::FinopsError;
use finops_core::application::App;
use finops_core::domain::project::ProjectConfig;
use finops_core::infrastructure::config::project::load_project_config;
use miette::Diagnostic;

/// Loads the project file and builds every enabled unit.
pub fn compose(project_dir: &Path) -> Result<(ProjectConfig, App), FinopsError> {
    let config = load_project_config(project_dir)?;
    let app = App::from_config(&config)?;
    tracing::debug!(stacks = ?app.stack_names(), dir = %project_dir.display(), "Project composed");
    Ok((config, app))
}

/// Prints the diagnostic (message, code, help) and exits non-zero for CI/CD.
pub fn fail(context: &str, err: &FinopsError) -> ! {
    eprintln!("❌ {}: {}", context, err);
    if let Some(code) = err.code() {
        eprintln!("   code: {}", code);
    }
    if let Some(help) = err.help() {
        eprintln!("   👉 {}", help);
    }
    std::process::exit(1);
}

/// Operator notice for a load balancer reachable from any address.
pub fn warn_open_ingress(app: &App) {
    if let Some(rule) = app.dashboard_ingress().filter(|rule| rule.is_open()) {
        println!(
            "   ⚠️  Dashboard ingress is open to {}; set dashboard.allowed_cidr before deploying to production",
            rule.cidr
        );
    }
}
