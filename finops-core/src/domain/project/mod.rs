// finops-core/src/domain/project/mod.rs

pub mod account;
pub mod configuration;

pub use account::{AccountId, validate_region};
pub use configuration::{
    BillingExportSettings, DashboardSettings, ExistingNetworkSettings, NetworkSettings,
    NewNetworkSettings, Posture, ProjectConfig,
};
