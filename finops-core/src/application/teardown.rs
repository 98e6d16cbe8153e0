// finops-core/src/application/teardown.rs
//
// What deleting a stack does: destroyed resources in deletion order, and the
// ones left behind because their removal policy retains them.

use serde::Serialize;

use crate::domain::error::DomainError;
use crate::domain::resource::StackTemplate;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TeardownEntry {
    pub logical_id: String,
    pub resource_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeardownPlan {
    pub stack_name: String,
    /// Reverse creation order.
    pub destroyed: Vec<TeardownEntry>,
    pub retained: Vec<TeardownEntry>,
}

impl TeardownPlan {
    pub fn for_template(template: &StackTemplate) -> Result<Self, DomainError> {
        let mut destroyed = Vec::new();
        let mut retained = Vec::new();

        for layer in template.creation_plan()?.iter().rev() {
            for id in layer {
                let Some(resource) = template.resource(id) else {
                    continue;
                };
                let entry = TeardownEntry {
                    logical_id: resource.logical_id.clone(),
                    resource_type: resource.resource_type.clone(),
                };
                if resource.removal.is_retained() {
                    retained.push(entry);
                } else {
                    destroyed.push(entry);
                }
            }
        }

        Ok(Self {
            stack_name: template.stack_name.clone(),
            destroyed,
            retained,
        })
    }

    pub fn is_retained(&self, logical_id: &str) -> bool {
        self.retained.iter().any(|e| e.logical_id == logical_id)
    }

    pub fn is_destroyed(&self, logical_id: &str) -> bool {
        self.destroyed.iter().any(|e| e.logical_id == logical_id)
    }

    pub fn deletion_index(&self, logical_id: &str) -> Option<usize> {
        self.destroyed.iter().position(|e| e.logical_id == logical_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::billing_export::{self, BillingExportUnit};
    use crate::application::dashboard::{self, DashboardUnit};
    use crate::domain::ports::StackSynthesizer;
    use crate::domain::project::{AccountId, BillingExportSettings, DashboardSettings, Posture};
    use anyhow::Result;

    #[test]
    fn test_dashboard_teardown_deletes_secret() -> Result<()> {
        let account = AccountId::parse("123456789012")?;
        let unit = DashboardUnit::new(&DashboardSettings::default(), &account, "eu-west-1", Posture::Dev)?;
        let plan = TeardownPlan::for_template(&unit.synthesize()?)?;

        assert!(plan.is_destroyed(dashboard::SECRET_ID));
        assert!(plan.retained.is_empty());

        // The service goes before the cluster it runs in.
        let service = plan.deletion_index(dashboard::SERVICE_ID);
        let cluster = plan.deletion_index(dashboard::CLUSTER_ID);
        assert!(service.is_some() && cluster.is_some() && service < cluster);
        Ok(())
    }

    #[test]
    fn test_billing_teardown_retains_bucket() -> Result<()> {
        let account = AccountId::parse("123456789012")?;
        let unit = BillingExportUnit::new(&BillingExportSettings::default(), &account)?;
        let plan = TeardownPlan::for_template(&unit.synthesize()?)?;

        assert!(plan.is_retained(billing_export::BUCKET_ID));
        assert!(plan.is_retained(billing_export::BUCKET_POLICY_ID));
        assert!(plan.is_destroyed(billing_export::CRAWLER_ID));
        assert!(plan.is_destroyed(billing_export::REPORT_ID));
        Ok(())
    }
}
