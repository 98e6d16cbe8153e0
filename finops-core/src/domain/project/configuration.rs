// finops-core/src/domain/project/configuration.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use validator::{Validate, ValidationError};

use crate::domain::billing::{DeleteBehavior, PLATFORM_REPORT_REGION};

/// Deployment posture for security guardrails.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Posture {
    /// Open ingress is tolerated with a warning.
    #[default]
    Dev,
    /// Open ingress must be explicitly acknowledged.
    Prod,
}

impl Posture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Prod => "prod",
        }
    }
}

impl fmt::Display for Posture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Posture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Self::Dev),
            "prod" | "production" => Ok(Self::Prod),
            _ => Err(format!("Unknown posture: {}", s)),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ProjectConfig {
    #[validate(length(min = 1, message = "Project name cannot be empty"))]
    pub name: String,

    /// Can be supplied later through FINOPS_ACCOUNT.
    #[serde(default)]
    pub account: Option<String>,

    /// Default region for stacks that do not pin their own.
    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default)]
    pub posture: Posture,

    #[serde(rename = "out-dir", default = "default_out_dir")]
    pub out_dir: String,

    #[serde(default)]
    #[validate(nested)]
    pub billing_export: BillingExportSettings,

    #[serde(default)]
    #[validate(nested)]
    pub dashboard: DashboardSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
#[serde(default)]
pub struct BillingExportSettings {
    pub enabled: bool,

    #[validate(length(min = 1, max = 128))]
    pub stack_name: String,

    /// The export stack hosts the report definition, so it defaults to the
    /// platform region rather than the project region.
    pub region: Option<String>,

    #[validate(length(min = 3, max = 24))]
    pub bucket_prefix: String,

    #[validate(custom(function = "validate_prefix_segment"))]
    pub export_prefix: String,

    #[validate(range(min = 1, max = 3650))]
    pub retention_days: u32,

    #[validate(length(min = 1, max = 255))]
    pub database_name: String,

    #[validate(length(min = 1, max = 255))]
    pub crawler_name: String,

    pub crawler_schedule: String,

    /// Additional crawl paths; each must stay inside the export prefix.
    pub extra_crawl_targets: Vec<String>,

    pub delete_behavior: DeleteBehavior,

    #[validate(length(min = 1, max = 256))]
    pub report_name: String,

    /// Only accepted when it matches the platform region.
    pub report_region: Option<String>,
}

impl Default for BillingExportSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            stack_name: "AtlasStudioFinOps-CUR".to_string(),
            region: None,
            bucket_prefix: "finops-cur".to_string(),
            export_prefix: "cur".to_string(),
            retention_days: 730,
            database_name: "cur_db".to_string(),
            crawler_name: "cur-crawler".to_string(),
            crawler_schedule: "cron(0 6 * * ? *)".to_string(),
            extra_crawl_targets: Vec::new(),
            delete_behavior: DeleteBehavior::default(),
            report_name: "finops-daily".to_string(),
            report_region: None,
        }
    }
}

impl BillingExportSettings {
    pub fn effective_region(&self) -> &str {
        self.region.as_deref().unwrap_or(PLATFORM_REPORT_REGION)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
#[serde(default)]
pub struct DashboardSettings {
    pub enabled: bool,

    #[validate(length(min = 1, max = 128))]
    pub stack_name: String,

    /// Falls back to the project region.
    pub region: Option<String>,

    pub network: NetworkSettings,

    /// Defaults to 0.0.0.0/0. Restrict it for production.
    pub allowed_cidr: Option<String>,

    pub acknowledge_open_ingress: bool,

    #[validate(length(min = 1))]
    pub image: String,

    pub cpu: u32,

    pub memory_mib: u32,

    #[validate(range(min = 1, max = 10))]
    pub desired_count: u32,

    #[validate(length(min = 1, max = 512))]
    pub secret_name: String,

    #[validate(length(min = 1, max = 64))]
    pub admin_username: String,

    pub extra_environment: BTreeMap<String, String>,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            stack_name: "AtlasStudioFinOps-Grafana".to_string(),
            region: None,
            network: NetworkSettings::default(),
            allowed_cidr: None,
            acknowledge_open_ingress: false,
            image: "grafana/grafana:10.4.0".to_string(),
            cpu: 512,
            memory_mib: 1024,
            desired_count: 1,
            secret_name: "grafana/admin".to_string(),
            admin_username: "admin".to_string(),
            extra_environment: BTreeMap::new(),
        }
    }
}

/// Raw, unvalidated network selection. Exactly one side must be set; the
/// domain resolves it into a `NetworkConfig`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NetworkSettings {
    #[serde(default)]
    pub existing: Option<ExistingNetworkSettings>,
    #[serde(default)]
    pub new: Option<NewNetworkSettings>,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            existing: None,
            new: Some(NewNetworkSettings::default()),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ExistingNetworkSettings {
    pub vpc_id: String,
    #[serde(default)]
    pub public_subnet_ids: Vec<String>,
    #[serde(default)]
    pub private_subnet_ids: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct NewNetworkSettings {
    pub cidr: String,
    pub max_azs: u8,
    pub nat_gateways: u8,
}

impl Default for NewNetworkSettings {
    fn default() -> Self {
        Self {
            cidr: "10.0.0.0/16".to_string(),
            max_azs: 2,
            nat_gateways: 1,
        }
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}
fn default_out_dir() -> String {
    "finops.out".to_string()
}

fn validate_prefix_segment(prefix: &str) -> Result<(), ValidationError> {
    let ok = !prefix.is_empty()
        && !prefix.starts_with('/')
        && !prefix.ends_with('/')
        && prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/' | '.'));
    if ok {
        Ok(())
    } else {
        Err(ValidationError::new("export_prefix")
            .with_message("export prefix must be a relative key prefix without leading or trailing '/'".into()))
    }
}
