// finops-core/src/application/billing_export.rs
//
// USE CASE: Billing-Export Unit. Private bucket + export-principal grants,
// metadata catalog and crawler, read-only analytics role, report definition.

use serde_json::{Value, json};
use tracing::{info, instrument};

use super::iam::service_role;
use crate::domain::billing::grant::policy_document;
use crate::domain::billing::{
    AccessGrant, CatalogDefinition, CrawlerSchedule, ExportBucketConfig, ReportDefinition,
    SchemaChangePolicy, export_source_arn,
};
use crate::domain::error::DomainError;
use crate::domain::ports::StackSynthesizer;
use crate::domain::project::{AccountId, BillingExportSettings, validate_region};
use crate::domain::resource::intrinsic::{get_att, reference};
use crate::domain::resource::{RemovalPolicy, ResourceDescriptor, StackTemplate};

pub const BUCKET_ID: &str = "CurBucket";
pub const BUCKET_POLICY_ID: &str = "CurBucketPolicy";
pub const DATABASE_ID: &str = "CurDatabase";
pub const CRAWLER_ROLE_ID: &str = "GlueCrawlerRole";
pub const CRAWLER_ID: &str = "CurCrawler";
pub const ANALYTICS_ROLE_ID: &str = "RedshiftSpectrumRole";
pub const REPORT_ID: &str = "CurDefinition";

pub const OUTPUT_BUCKET_NAME: &str = "CurBucketName";
pub const OUTPUT_ANALYTICS_ROLE: &str = "RedshiftSpectrumRoleArn";

const CRAWLER_MANAGED_POLICY: &str = "arn:aws:iam::aws:policy/service-role/AWSGlueServiceRole";
const CATALOG_READ_ACTIONS: [&str; 7] = [
    "glue:GetDatabase",
    "glue:GetDatabases",
    "glue:GetTable",
    "glue:GetTables",
    "glue:GetPartition",
    "glue:GetPartitions",
    "athena:GetDataCatalog",
];

#[derive(Debug, Clone)]
pub struct BillingExportUnit {
    stack_name: String,
    account: AccountId,
    bucket: ExportBucketConfig,
    bucket_grants: Vec<AccessGrant>,
    catalog: CatalogDefinition,
    analytics_grants: Vec<AccessGrant>,
    report: ReportDefinition,
}

impl BillingExportUnit {
    /// Builds and validates every record of the unit. Nothing is rendered
    /// unless all invariants hold.
    #[instrument(skip(settings), fields(stack = %settings.stack_name))]
    pub fn new(settings: &BillingExportSettings, account: &AccountId) -> Result<Self, DomainError> {
        let region = settings.effective_region();
        validate_region(region)?;

        let bucket = ExportBucketConfig::try_new(
            &settings.bucket_prefix,
            account,
            region,
            &settings.export_prefix,
            settings.retention_days,
        )?;

        let report_region = settings.report_region.as_deref().unwrap_or(region);
        let report = ReportDefinition::try_new(&settings.report_name, &bucket, report_region)?;

        let source_arn = export_source_arn(account.as_str());
        let bucket_grants = vec![
            AccessGrant::deny_insecure_transport(vec![
                json!(bucket.arn()),
                json!(format!("{}/*", bucket.arn())),
            ]),
            AccessGrant::for_export_principal(
                "CurDiscoverBucket",
                &["s3:GetBucketAcl", "s3:GetBucketPolicy"],
                vec![json!(bucket.arn())],
                account.as_str(),
                &source_arn,
            )?,
            AccessGrant::for_export_principal(
                "CurWriteObjects",
                &["s3:PutObject"],
                vec![json!(format!("{}/*", bucket.arn()))],
                account.as_str(),
                &source_arn,
            )?,
        ];

        let catalog = CatalogDefinition::try_new(
            &settings.database_name,
            &settings.crawler_name,
            &bucket,
            &settings.extra_crawl_targets,
            CrawlerSchedule::parse(&settings.crawler_schedule)?,
            SchemaChangePolicy {
                delete: settings.delete_behavior,
                ..SchemaChangePolicy::default()
            },
        )?;

        let analytics_grants = vec![
            AccessGrant::bucket_read(&bucket.arn(), &bucket.export_objects_arn()),
            AccessGrant::allow(&CATALOG_READ_ACTIONS, vec![json!("*")]),
        ];

        let unit = Self {
            stack_name: settings.stack_name.clone(),
            account: account.clone(),
            bucket,
            bucket_grants,
            catalog,
            analytics_grants,
            report,
        };
        unit.check_invariants()?;

        info!(bucket = %unit.bucket.name(), report = %unit.report.name, "Billing export unit ready");
        Ok(unit)
    }

    /// Re-checked right before rendering so no later edit can slip past.
    fn check_invariants(&self) -> Result<(), DomainError> {
        if !self.bucket.block_public_access() || !self.bucket.enforce_tls() {
            return Err(DomainError::BucketInvariant(
                "export bucket must block public access and enforce TLS".into(),
            ));
        }
        if self.bucket.removal() != RemovalPolicy::Retain {
            return Err(DomainError::BucketInvariant(
                "export bucket must be retained on stack deletion".into(),
            ));
        }
        for grant in &self.bucket_grants {
            grant.validate()?;
        }
        for grant in &self.analytics_grants {
            if let Some(action) = grant.first_write_action() {
                return Err(DomainError::AnalyticsWriteAccess(action.to_string()));
            }
        }
        Ok(())
    }

    fn bucket_descriptor(&self) -> ResourceDescriptor {
        ResourceDescriptor::new(BUCKET_ID, "AWS::S3::Bucket", self.bucket.removal()).with_properties(
            json!({
                "BucketName": self.bucket.name(),
                "PublicAccessBlockConfiguration": {
                    "BlockPublicAcls": self.bucket.block_public_access(),
                    "BlockPublicPolicy": self.bucket.block_public_access(),
                    "IgnorePublicAcls": self.bucket.block_public_access(),
                    "RestrictPublicBuckets": self.bucket.block_public_access(),
                },
                "VersioningConfiguration": {
                    "Status": if self.bucket.versioned() { "Enabled" } else { "Suspended" },
                },
                "LifecycleConfiguration": {
                    "Rules": [{
                        "Status": "Enabled",
                        "ExpirationInDays": self.bucket.retention_days(),
                    }],
                },
            }),
        )
    }

    fn bucket_policy_descriptor(&self) -> ResourceDescriptor {
        // Retained with the bucket so exports keep landing after a teardown.
        ResourceDescriptor::new(BUCKET_POLICY_ID, "AWS::S3::BucketPolicy", RemovalPolicy::Retain)
            .with_properties(json!({
                "Bucket": reference(BUCKET_ID),
                "PolicyDocument": policy_document(&self.bucket_grants),
            }))
    }

    fn crawler_descriptor(&self) -> ResourceDescriptor {
        let targets: Vec<Value> = self
            .catalog
            .targets
            .iter()
            .map(|path| json!({ "Path": path }))
            .collect();

        ResourceDescriptor::new(CRAWLER_ID, "AWS::Glue::Crawler", RemovalPolicy::Delete)
            .with_properties(json!({
                "Name": self.catalog.crawler_name,
                "Role": get_att(CRAWLER_ROLE_ID, "Arn"),
                "DatabaseName": reference(DATABASE_ID),
                "Targets": { "S3Targets": targets },
                "Schedule": { "ScheduleExpression": self.catalog.schedule.expression() },
                "SchemaChangePolicy": {
                    "UpdateBehavior": self.catalog.schema_change.update_str(),
                    "DeleteBehavior": self.catalog.schema_change.delete_str(),
                },
            }))
    }
}

impl StackSynthesizer for BillingExportUnit {
    fn stack_name(&self) -> &str {
        &self.stack_name
    }

    #[instrument(skip(self), fields(stack = %self.stack_name))]
    fn synthesize(&self) -> Result<StackTemplate, DomainError> {
        self.check_invariants()?;

        let crawler_grants = [AccessGrant::bucket_read(
            &self.bucket.arn(),
            &self.bucket.export_objects_arn(),
        )];

        let mut builder =
            StackTemplate::builder(&self.stack_name, self.account.as_str(), self.bucket.region())
                .description("Cost and Usage Report export: bucket, catalog, analytics role");

        builder
            .add(self.bucket_descriptor())?
            .add(self.bucket_policy_descriptor())?
            .add(
                ResourceDescriptor::new(DATABASE_ID, "AWS::Glue::Database", RemovalPolicy::Delete)
                    .with_properties(json!({
                        "CatalogId": self.account.as_str(),
                        "DatabaseInput": { "Name": self.catalog.database_name },
                    })),
            )?
            .add(service_role(
                CRAWLER_ROLE_ID,
                "glue.amazonaws.com",
                &[CRAWLER_MANAGED_POLICY],
                Some(("CurBucketRead", &crawler_grants[..])),
            ))?
            .add(self.crawler_descriptor())?
            .add(service_role(
                ANALYTICS_ROLE_ID,
                "redshift.amazonaws.com",
                &[],
                Some(("CurAnalyticsRead", self.analytics_grants.as_slice())),
            ))?
            .add(
                // The report writes into the bucket, so the policy must exist first.
                ResourceDescriptor::new(REPORT_ID, "AWS::CUR::ReportDefinition", RemovalPolicy::Delete)
                    .with_properties(self.report.properties())
                    .depends_on(BUCKET_POLICY_ID),
            )?;

        builder
            .output(
                OUTPUT_BUCKET_NAME,
                reference(BUCKET_ID),
                Some("Bucket receiving the billing export"),
            )
            .output(
                OUTPUT_ANALYTICS_ROLE,
                get_att(ANALYTICS_ROLE_ID, "Arn"),
                Some("Role the analytics engine assumes to read the export"),
            );

        builder.build()
    }
}
