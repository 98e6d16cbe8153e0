// finops-core/src/domain/billing/mod.rs
//
// Records describing the billing export: the bucket, who may write to it,
// the metadata catalog over it and the report definition that feeds it.

pub mod bucket;
pub mod catalog;
pub mod grant;
pub mod report;

pub use bucket::ExportBucketConfig;
pub use catalog::{CatalogDefinition, CrawlerSchedule, DeleteBehavior, SchemaChangePolicy};
pub use grant::{AccessGrant, Effect, Principal};
pub use report::ReportDefinition;

/// Service principal the billing export job writes as.
pub const EXPORT_SERVICE_PRINCIPAL: &str = "billingreports.amazonaws.com";

/// The report-definition service only exists in this region.
pub const PLATFORM_REPORT_REGION: &str = "us-east-1";

/// `aws:SourceArn` pattern for report definitions owned by `account`.
pub fn export_source_arn(account: &str) -> String {
    format!("arn:aws:cur:{}:{}:definition/*", PLATFORM_REPORT_REGION, account)
}
