// finops-core/src/application/iam.rs
//
// Service roles shared by both units.

use serde_json::json;

use crate::domain::billing::AccessGrant;
use crate::domain::billing::grant::policy_document;
use crate::domain::resource::{RemovalPolicy, ResourceDescriptor};

/// An IAM role assumable by `service`, with optional managed policies and one
/// inline policy made of `grants`.
pub fn service_role(
    logical_id: &str,
    service: &str,
    managed_policies: &[&str],
    inline: Option<(&str, &[AccessGrant])>,
) -> ResourceDescriptor {
    let mut properties = json!({
        "AssumeRolePolicyDocument": {
            "Version": "2012-10-17",
            "Statement": [{
                "Effect": "Allow",
                "Principal": { "Service": service },
                "Action": "sts:AssumeRole",
            }],
        },
    });
    if !managed_policies.is_empty() {
        properties["ManagedPolicyArns"] = json!(managed_policies);
    }
    if let Some((name, grants)) = inline {
        properties["Policies"] = json!([{
            "PolicyName": name,
            "PolicyDocument": policy_document(grants),
        }]);
    }
    ResourceDescriptor::new(logical_id, "AWS::IAM::Role", RemovalPolicy::Delete)
        .with_properties(properties)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_without_inline_policy() {
        let role = service_role("TaskRole", "ecs-tasks.amazonaws.com", &[], None);
        assert!(role.property("Policies").is_none());
        assert!(role.property("ManagedPolicyArns").is_none());
        assert_eq!(
            role.properties["AssumeRolePolicyDocument"]["Statement"][0]["Principal"]["Service"],
            "ecs-tasks.amazonaws.com"
        );
    }

    #[test]
    fn test_role_with_grants() {
        let grants = [AccessGrant::allow(&["logs:PutLogEvents"], vec![json!("*")])];
        let role = service_role("ExecRole", "ecs-tasks.amazonaws.com", &[], Some(("Exec", &grants[..])));
        assert_eq!(role.properties["Policies"][0]["PolicyName"], "Exec");
        assert_eq!(
            role.properties["Policies"][0]["PolicyDocument"]["Statement"][0]["Action"][0],
            "logs:PutLogEvents"
        );
    }
}
