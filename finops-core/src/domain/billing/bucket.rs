// finops-core/src/domain/billing/bucket.rs

use serde::Serialize;

use crate::domain::error::DomainError;
use crate::domain::project::AccountId;
use crate::domain::resource::RemovalPolicy;

/// The private bucket receiving billing exports.
///
/// Public-access blocking and TLS enforcement are not fields: they cannot be
/// configured, only asserted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportBucketConfig {
    name: String,
    region: String,
    export_prefix: String,
    retention_days: u32,
    versioned: bool,
    removal: RemovalPolicy,
}

impl ExportBucketConfig {
    pub fn try_new(
        name_prefix: &str,
        account: &AccountId,
        region: &str,
        export_prefix: &str,
        retention_days: u32,
    ) -> Result<Self, DomainError> {
        let name = format!("{}-{}-{}", name_prefix, account, region);
        validate_bucket_name(&name)?;

        if retention_days == 0 {
            return Err(DomainError::BucketInvariant(
                "retention must be at least one day".into(),
            ));
        }

        Ok(Self {
            name,
            region: region.to_string(),
            export_prefix: export_prefix.trim_matches('/').to_string(),
            retention_days,
            versioned: true,
            removal: RemovalPolicy::Retain,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn export_prefix(&self) -> &str {
        &self.export_prefix
    }

    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    pub fn versioned(&self) -> bool {
        self.versioned
    }

    pub fn removal(&self) -> RemovalPolicy {
        self.removal
    }

    pub fn block_public_access(&self) -> bool {
        true
    }

    pub fn enforce_tls(&self) -> bool {
        true
    }

    pub fn arn(&self) -> String {
        format!("arn:aws:s3:::{}", self.name)
    }

    /// ARN pattern covering every object under the export prefix.
    pub fn export_objects_arn(&self) -> String {
        format!("{}/{}/*", self.arn(), self.export_prefix)
    }

    /// `s3://bucket/prefix/`, the root every crawl target must live under.
    pub fn export_uri(&self) -> String {
        format!("s3://{}/{}/", self.name, self.export_prefix)
    }
}

fn validate_bucket_name(name: &str) -> Result<(), DomainError> {
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.');
    let valid_edges = name
        .chars()
        .next()
        .zip(name.chars().last())
        .is_some_and(|(first, last)| first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric());

    if (3..=63).contains(&name.len()) && valid_chars && valid_edges && !name.contains("..") {
        Ok(())
    } else {
        Err(DomainError::BucketInvariant(format!(
            "'{}' is not a valid bucket name (3-63 lowercase letters, digits, '-' or '.')",
            name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn account() -> Result<AccountId> {
        Ok(AccountId::parse("123456789012")?)
    }

    #[test]
    fn test_default_shape() -> Result<()> {
        let bucket = ExportBucketConfig::try_new("finops-cur", &account()?, "us-east-1", "cur", 730)?;
        assert_eq!(bucket.name(), "finops-cur-123456789012-us-east-1");
        assert_eq!(bucket.arn(), "arn:aws:s3:::finops-cur-123456789012-us-east-1");
        assert_eq!(
            bucket.export_uri(),
            "s3://finops-cur-123456789012-us-east-1/cur/"
        );
        assert!(bucket.block_public_access());
        assert!(bucket.enforce_tls());
        assert!(bucket.versioned());
        assert_eq!(bucket.removal(), RemovalPolicy::Retain);
        Ok(())
    }

    #[test]
    fn test_uppercase_prefix_is_rejected() -> Result<()> {
        let result = ExportBucketConfig::try_new("FinOps", &account()?, "us-east-1", "cur", 730);
        assert!(matches!(result, Err(DomainError::BucketInvariant(_))));
        Ok(())
    }

    #[test]
    fn test_name_too_long_is_rejected() -> Result<()> {
        let prefix = "a".repeat(50);
        let result = ExportBucketConfig::try_new(&prefix, &account()?, "us-east-1", "cur", 730);
        assert!(result.is_err());
        Ok(())
    }
}
