// finops-core/src/domain/dashboard/credential.rs

use serde::Serialize;
use serde_json::{Value, json};

use crate::domain::error::DomainError;
use crate::domain::resource::RemovalPolicy;

pub const USERNAME_KEY: &str = "username";
pub const PASSWORD_KEY: &str = "password";

/// The generated admin credential pair.
///
/// Destroyed with the stack: admin credentials are disposable, unlike the
/// billing history kept in the export bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CredentialSecret {
    pub name: String,
    pub username: String,
    pub exclude_punctuation: bool,
    pub removal: RemovalPolicy,
}

/// A container variable whose value is resolved from the secret store at task start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretInjection {
    pub env_name: String,
    pub json_key: String,
}

impl CredentialSecret {
    pub fn try_new(name: &str, username: &str) -> Result<Self, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::InvalidConfig("secret name cannot be empty".into()));
        }
        if username.trim().is_empty() {
            return Err(DomainError::InvalidConfig(
                "admin username cannot be empty".into(),
            ));
        }
        Ok(Self {
            name: name.to_string(),
            username: username.to_string(),
            exclude_punctuation: true,
            removal: RemovalPolicy::Delete,
        })
    }

    pub fn generate_properties(&self) -> Value {
        json!({
            "Name": self.name,
            "GenerateSecretString": {
                "SecretStringTemplate": json!({ USERNAME_KEY: self.username }).to_string(),
                "GenerateStringKey": PASSWORD_KEY,
                "ExcludePunctuation": self.exclude_punctuation,
            },
        })
    }

    pub fn inject(&self, env_name: &str, json_key: &str) -> SecretInjection {
        SecretInjection {
            env_name: env_name.to_string(),
            json_key: json_key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_generated_secret_shape() -> Result<()> {
        let secret = CredentialSecret::try_new("grafana/admin", "admin")?;
        assert_eq!(secret.removal, RemovalPolicy::Delete);

        let props = secret.generate_properties();
        assert_eq!(props["Name"], "grafana/admin");
        assert_eq!(
            props["GenerateSecretString"]["SecretStringTemplate"],
            r#"{"username":"admin"}"#
        );
        assert_eq!(props["GenerateSecretString"]["GenerateStringKey"], "password");
        assert_eq!(props["GenerateSecretString"]["ExcludePunctuation"], true);
        Ok(())
    }

    #[test]
    fn test_empty_names_rejected() {
        assert!(CredentialSecret::try_new("", "admin").is_err());
        assert!(CredentialSecret::try_new("grafana/admin", " ").is_err());
    }
}
