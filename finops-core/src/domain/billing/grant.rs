// finops-core/src/domain/billing/grant.rs

use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, BTreeSet};

use super::EXPORT_SERVICE_PRINCIPAL;
use crate::domain::error::DomainError;

pub const SOURCE_ACCOUNT_KEY: &str = "aws:SourceAccount";
pub const SOURCE_ARN_KEY: &str = "aws:SourceArn";

const WRITE_VERBS: [&str; 10] = [
    "Put", "Delete", "Create", "Update", "Write", "Restore", "Replicate", "Abort", "Tag", "Untag",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    Allow,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Principal {
    /// Identity policies attached to a role carry no principal.
    None,
    Anyone,
    Service(String),
}

impl Principal {
    pub fn is_export_principal(&self) -> bool {
        matches!(self, Self::Service(s) if s == EXPORT_SERVICE_PRINCIPAL)
    }
}

/// One policy statement: who may do what on which resources, under which conditions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessGrant {
    pub sid: Option<String>,
    pub effect: Effect,
    pub principal: Principal,
    pub actions: BTreeSet<String>,
    pub resources: Vec<Value>,
    /// operator -> (key -> value)
    pub conditions: BTreeMap<String, BTreeMap<String, String>>,
}

impl AccessGrant {
    /// A grant to the billing export principal. Both source conditions are mandatory.
    pub fn for_export_principal(
        sid: &str,
        actions: &[&str],
        resources: Vec<Value>,
        source_account: &str,
        source_arn: &str,
    ) -> Result<Self, DomainError> {
        let mut equals = BTreeMap::new();
        equals.insert(SOURCE_ARN_KEY.to_string(), source_arn.trim().to_string());
        equals.insert(SOURCE_ACCOUNT_KEY.to_string(), source_account.trim().to_string());

        let grant = Self {
            sid: Some(sid.to_string()),
            effect: Effect::Allow,
            principal: Principal::Service(EXPORT_SERVICE_PRINCIPAL.to_string()),
            actions: actions.iter().map(|a| a.to_string()).collect(),
            resources,
            conditions: BTreeMap::from([("StringEquals".to_string(), equals)]),
        };
        grant.validate()?;
        Ok(grant)
    }

    /// Identity-policy statement for a role (no principal, no conditions).
    pub fn allow(actions: &[&str], resources: Vec<Value>) -> Self {
        Self {
            sid: None,
            effect: Effect::Allow,
            principal: Principal::None,
            actions: actions.iter().map(|a| a.to_string()).collect(),
            resources,
            conditions: BTreeMap::new(),
        }
    }

    /// Denies every request that does not arrive over TLS.
    pub fn deny_insecure_transport(resources: Vec<Value>) -> Self {
        let mut secure = BTreeMap::new();
        secure.insert("aws:SecureTransport".to_string(), "false".to_string());
        Self {
            sid: Some("DenyInsecureTransport".to_string()),
            effect: Effect::Deny,
            principal: Principal::Anyone,
            actions: BTreeSet::from(["s3:*".to_string()]),
            resources,
            conditions: BTreeMap::from([("Bool".to_string(), secure)]),
        }
    }

    /// Read access to a bucket and the objects under `prefix`.
    pub fn bucket_read(bucket_arn: &str, objects_arn: &str) -> Self {
        Self::allow(
            &["s3:GetObject*", "s3:GetBucket*", "s3:List*"],
            vec![json!(bucket_arn), json!(objects_arn)],
        )
    }

    fn condition_value(&self, key: &str) -> Option<&str> {
        self.conditions
            .values()
            .find_map(|entries| entries.get(key))
            .map(String::as_str)
    }

    /// Export-principal grants must be pinned to this account and its report definitions.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.principal.is_export_principal() {
            return Ok(());
        }
        for key in [SOURCE_ACCOUNT_KEY, SOURCE_ARN_KEY] {
            if self.condition_value(key).is_none_or(str::is_empty) {
                return Err(DomainError::MissingSourceCondition {
                    principal: EXPORT_SERVICE_PRINCIPAL.to_string(),
                    condition: key.to_string(),
                });
            }
        }
        Ok(())
    }

    /// First action that mutates state, if any. Wildcard actions count as writes.
    pub fn first_write_action(&self) -> Option<&str> {
        self.actions
            .iter()
            .find(|action| {
                let verb = action.split_once(':').map_or(action.as_str(), |(_, v)| v);
                verb == "*" || WRITE_VERBS.iter().any(|w| verb.starts_with(w))
            })
            .map(String::as_str)
    }

    pub fn to_statement(&self) -> Value {
        let mut statement = Map::new();
        if let Some(sid) = &self.sid {
            statement.insert("Sid".into(), json!(sid));
        }
        statement.insert(
            "Effect".into(),
            json!(match self.effect {
                Effect::Allow => "Allow",
                Effect::Deny => "Deny",
            }),
        );
        match &self.principal {
            Principal::None => {}
            Principal::Anyone => {
                statement.insert("Principal".into(), json!({ "AWS": "*" }));
            }
            Principal::Service(service) => {
                statement.insert("Principal".into(), json!({ "Service": service }));
            }
        }
        let actions: Vec<&String> = self.actions.iter().collect();
        statement.insert("Action".into(), json!(actions));
        statement.insert("Resource".into(), json!(self.resources));
        if !self.conditions.is_empty() {
            statement.insert("Condition".into(), json!(self.conditions));
        }
        Value::Object(statement)
    }
}

pub fn policy_document(grants: &[AccessGrant]) -> Value {
    let statements: Vec<Value> = grants.iter().map(AccessGrant::to_statement).collect();
    json!({ "Version": "2012-10-17", "Statement": statements })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    const ARN: &str = "arn:aws:cur:us-east-1:123456789012:definition/*";

    #[test]
    fn test_export_grant_requires_both_conditions() -> Result<()> {
        let grant = AccessGrant::for_export_principal(
            "CurWrite",
            &["s3:PutObject"],
            vec![json!("arn:aws:s3:::b/*")],
            "123456789012",
            ARN,
        )?;
        let statement = grant.to_statement();
        assert_eq!(
            statement["Condition"]["StringEquals"][SOURCE_ACCOUNT_KEY],
            "123456789012"
        );
        assert_eq!(statement["Condition"]["StringEquals"][SOURCE_ARN_KEY], ARN);
        assert_eq!(statement["Principal"]["Service"], EXPORT_SERVICE_PRINCIPAL);

        let missing_account =
            AccessGrant::for_export_principal("CurWrite", &["s3:PutObject"], vec![], "  ", ARN);
        assert!(matches!(
            missing_account,
            Err(DomainError::MissingSourceCondition { condition, .. }) if condition == SOURCE_ACCOUNT_KEY
        ));

        let missing_arn =
            AccessGrant::for_export_principal("CurWrite", &["s3:PutObject"], vec![], "123456789012", "");
        assert!(matches!(
            missing_arn,
            Err(DomainError::MissingSourceCondition { condition, .. }) if condition == SOURCE_ARN_KEY
        ));
        Ok(())
    }

    #[test]
    fn test_hand_built_export_grant_fails_validation() {
        let mut grant = AccessGrant::allow(&["s3:PutObject"], vec![json!("arn:aws:s3:::b/*")]);
        grant.principal = Principal::Service(EXPORT_SERVICE_PRINCIPAL.to_string());
        assert!(grant.validate().is_err());
    }

    #[test]
    fn test_write_detection() {
        let read = AccessGrant::bucket_read("arn:aws:s3:::b", "arn:aws:s3:::b/cur/*");
        assert_eq!(read.first_write_action(), None);

        let glue = AccessGrant::allow(&["glue:GetTable", "glue:UpdateTable"], vec![json!("*")]);
        assert_eq!(glue.first_write_action(), Some("glue:UpdateTable"));

        let wildcard = AccessGrant::allow(&["s3:*"], vec![json!("*")]);
        assert_eq!(wildcard.first_write_action(), Some("s3:*"));
    }

    #[test]
    fn test_deny_insecure_transport_statement() {
        let statement =
            AccessGrant::deny_insecure_transport(vec![json!("arn:aws:s3:::b")]).to_statement();
        assert_eq!(statement["Effect"], "Deny");
        assert_eq!(statement["Condition"]["Bool"]["aws:SecureTransport"], "false");
    }
}
