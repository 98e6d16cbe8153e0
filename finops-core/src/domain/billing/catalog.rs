// finops-core/src/domain/billing/catalog.rs

use serde::{Deserialize, Serialize};

use super::bucket::ExportBucketConfig;
use crate::domain::error::DomainError;

/// How the crawler reacts to schema changes found in new export files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateBehavior {
    #[default]
    UpdateInDatabase,
    Log,
}

/// How the crawler reacts to tables or columns that disappeared.
///
/// There is no hard-delete variant: a transient gap in the export must not
/// drop tables that historical queries still use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeleteBehavior {
    #[default]
    DeprecateInDatabase,
    Log,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct SchemaChangePolicy {
    pub update: UpdateBehavior,
    pub delete: DeleteBehavior,
}

impl SchemaChangePolicy {
    pub fn update_str(&self) -> &'static str {
        match self.update {
            UpdateBehavior::UpdateInDatabase => "UPDATE_IN_DATABASE",
            UpdateBehavior::Log => "LOG",
        }
    }

    pub fn delete_str(&self) -> &'static str {
        match self.delete {
            DeleteBehavior::DeprecateInDatabase => "DEPRECATE_IN_DATABASE",
            DeleteBehavior::Log => "LOG",
        }
    }
}

/// A six-field cron schedule (`min hour day-of-month month day-of-week year`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlerSchedule {
    fields: String,
}

impl CrawlerSchedule {
    /// Accepts either `0 6 * * ? *` or `cron(0 6 * * ? *)`.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        let inner = trimmed
            .strip_prefix("cron(")
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(trimmed);

        let fields: Vec<&str> = inner.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(DomainError::InvalidConfig(format!(
                "crawler schedule '{}' must have 6 cron fields, found {}",
                raw,
                fields.len()
            )));
        }
        // Exactly one of day-of-month / day-of-week must be '?'.
        if (fields[2] == "?") == (fields[4] == "?") {
            return Err(DomainError::InvalidConfig(format!(
                "crawler schedule '{}' must use '?' in exactly one of day-of-month or day-of-week",
                raw
            )));
        }

        Ok(Self {
            fields: fields.join(" "),
        })
    }

    pub fn expression(&self) -> String {
        format!("cron({})", self.fields)
    }
}

impl Default for CrawlerSchedule {
    /// Daily at 06:00 UTC.
    fn default() -> Self {
        Self {
            fields: "0 6 * * ? *".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogDefinition {
    pub database_name: String,
    pub crawler_name: String,
    pub targets: Vec<String>,
    pub schedule: CrawlerSchedule,
    pub schema_change: SchemaChangePolicy,
}

impl CatalogDefinition {
    /// The export prefix itself is always crawled; `extra_targets` may add
    /// narrower paths below it.
    pub fn try_new(
        database_name: &str,
        crawler_name: &str,
        bucket: &ExportBucketConfig,
        extra_targets: &[String],
        schedule: CrawlerSchedule,
        schema_change: SchemaChangePolicy,
    ) -> Result<Self, DomainError> {
        let root = bucket.export_uri();
        let mut targets = vec![root.clone()];

        for target in extra_targets {
            let normalized = if target.ends_with('/') {
                target.clone()
            } else {
                format!("{}/", target)
            };
            if !normalized.starts_with(&root) || normalized.contains("/../") {
                return Err(DomainError::CrawlTargetOutsidePrefix {
                    target: target.clone(),
                    prefix: root,
                });
            }
            if !targets.contains(&normalized) {
                targets.push(normalized);
            }
        }

        Ok(Self {
            database_name: database_name.to_string(),
            crawler_name: crawler_name.to_string(),
            targets,
            schedule,
            schema_change,
        })
    }
}
