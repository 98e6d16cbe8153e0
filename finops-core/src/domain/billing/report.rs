// finops-core/src/domain/billing/report.rs

use serde::Serialize;
use serde_json::{Value, json};

use super::PLATFORM_REPORT_REGION;
use super::bucket::ExportBucketConfig;
use crate::domain::error::DomainError;

pub const TIME_UNIT: &str = "DAILY";
/// Format and compression are paired; the query-engine artifact needs both Parquet.
pub const FORMAT: &str = "Parquet";
pub const COMPRESSION: &str = "Parquet";
pub const SCHEMA_ELEMENTS: [&str; 2] = ["RESOURCES", "SPLIT_COST_ALLOCATION_DATA"];
pub const ARTIFACTS: [&str; 1] = ["ATHENA"];
pub const VERSIONING: &str = "OVERWRITE_REPORT";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDefinition {
    pub name: String,
    pub bucket: String,
    pub region: String,
    pub prefix: String,
}

impl ReportDefinition {
    /// `region` is the destination region the report is declared with; it
    /// must be the platform region whatever the rest of the estate uses.
    pub fn try_new(
        name: &str,
        bucket: &ExportBucketConfig,
        region: &str,
    ) -> Result<Self, DomainError> {
        if region != PLATFORM_REPORT_REGION {
            return Err(DomainError::ReportRegionMismatch {
                declared: region.to_string(),
                required: PLATFORM_REPORT_REGION.to_string(),
            });
        }
        if bucket.region() != PLATFORM_REPORT_REGION {
            return Err(DomainError::ReportRegionMismatch {
                declared: bucket.region().to_string(),
                required: PLATFORM_REPORT_REGION.to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            bucket: bucket.name().to_string(),
            region: region.to_string(),
            prefix: bucket.export_prefix().to_string(),
        })
    }

    pub fn properties(&self) -> Value {
        json!({
            "ReportName": self.name,
            "TimeUnit": TIME_UNIT,
            "Format": FORMAT,
            "Compression": COMPRESSION,
            "S3Bucket": self.bucket,
            "S3Region": self.region,
            "S3Prefix": self.prefix,
            "AdditionalSchemaElements": SCHEMA_ELEMENTS,
            "AdditionalArtifacts": ARTIFACTS,
            "RefreshClosedReports": true,
            "ReportVersioning": VERSIONING,
        })
    }
}
