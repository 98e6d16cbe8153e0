// finops-core/src/application/mod.rs

pub mod app;
pub mod billing_export;
pub mod clean;
pub mod dashboard;
pub mod graph;
pub mod iam;
pub mod teardown;

// --- RE-EXPORTS (FACADE) ---
// The CLI imports `use finops_core::application::{App, clean_project, ...};`
// without knowing the file layout.

pub use app::{App, CloudAssembly, OutputEntry};
pub use billing_export::BillingExportUnit;
pub use clean::{clean_project, resolve_out_dir};
pub use dashboard::DashboardUnit;
pub use graph::DependencyReport;
pub use teardown::TeardownPlan;
