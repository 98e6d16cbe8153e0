// finops-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    // --- BILLING EXPORT ---
    #[error("Report definition region '{declared}' does not match the platform region '{required}'")]
    #[diagnostic(
        code(finops::domain::report_region),
        help("Cost and Usage Report definitions only exist in '{required}'. Deploy the export stack there.")
    )]
    ReportRegionMismatch { declared: String, required: String },

    #[error("Access grant to '{principal}' is missing the '{condition}' condition")]
    #[diagnostic(
        code(finops::domain::grant_condition),
        help("Every grant to the export principal must carry both aws:SourceAccount and aws:SourceArn.")
    )]
    MissingSourceCondition {
        principal: String,
        condition: String,
    },

    #[error("Crawl target '{target}' is outside the export prefix '{prefix}'")]
    #[diagnostic(code(finops::domain::crawl_target))]
    CrawlTargetOutsidePrefix { target: String, prefix: String },

    #[error("Analytics role cannot be granted write action '{0}'")]
    #[diagnostic(
        code(finops::domain::analytics_write),
        help("The analytics role is read-only: storage reads and catalog metadata queries only.")
    )]
    AnalyticsWriteAccess(String),

    #[error("Export bucket invariant violated: {0}")]
    #[diagnostic(code(finops::domain::bucket))]
    BucketInvariant(String),

    #[error("Invalid account id '{0}'")]
    #[diagnostic(
        code(finops::domain::account),
        help("Account ids are exactly 12 digits. Set `account` in finops.yaml or FINOPS_ACCOUNT.")
    )]
    InvalidAccountId(String),

    // --- DASHBOARD ---
    #[error("Network selection is ambiguous: {0}")]
    #[diagnostic(
        code(finops::domain::network),
        help("Set exactly one of `dashboard.network.existing` or `dashboard.network.new`.")
    )]
    NetworkSelection(String),

    #[error("Invalid CIDR '{0}'")]
    #[diagnostic(code(finops::domain::cidr))]
    InvalidCidr(String),

    #[error("Ingress is open to the world (0.0.0.0/0) under the '{0}' posture")]
    #[diagnostic(
        code(finops::domain::open_ingress),
        help("Restrict `allowed_cidr`, or set `acknowledge_open_ingress: true` to accept the exposure.")
    )]
    OpenIngressNotAcknowledged(String),

    #[error("Invalid container image reference '{0}'")]
    #[diagnostic(code(finops::domain::image))]
    InvalidImageReference(String),

    #[error("Credential '{0}' must be injected from the secret store, not set as a literal")]
    #[diagnostic(code(finops::domain::credential_leak))]
    CredentialLeak(String),

    // --- RESOURCE GRAPH ---
    #[error("Duplicate logical id '{0}'")]
    #[diagnostic(code(finops::domain::duplicate_id))]
    DuplicateLogicalId(String),

    #[error("Resource '{from}' references unknown resource '{to}'")]
    #[diagnostic(code(finops::domain::dangling_ref))]
    DanglingReference { from: String, to: String },

    #[error("Circular dependency detected involving: {0}")]
    #[diagnostic(code(finops::domain::cycle))]
    CircularDependency(String),

    #[error("Stack '{0}' not found")]
    #[diagnostic(code(finops::domain::stack_not_found))]
    StackNotFound(String),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(finops::domain::config))]
    InvalidConfig(String),
}
