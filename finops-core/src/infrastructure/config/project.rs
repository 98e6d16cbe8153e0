// finops-core/src/infrastructure/config/project.rs

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::domain::project::configuration::ProjectConfig;
use crate::infrastructure::error::InfrastructureError;

pub const CONFIG_CANDIDATES: [&str; 2] = ["finops.yaml", "finops_project.yaml"];

#[instrument(skip(project_dir))]
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    // 1. Discovery
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project configuration");

    // 2. Base YAML
    let content = fs::read_to_string(&config_path)?;
    let mut config: ProjectConfig = serde_yaml::from_str(&content)?;

    // 3. Environment layering: FINOPS_ACCOUNT=... finops synth
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    // 4. Structural rules. Cross-field invariants are checked by the domain.
    config.validate()?;

    Ok(config)
}

fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    for filename in CONFIG_CANDIDATES {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "No configuration file found in {:?}. Checked: {:?}",
        root, CONFIG_CANDIDATES
    )))
}

/// Applies `FINOPS_*` overrides read through `lookup`.
pub fn apply_env_overrides<F>(config: &mut ProjectConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("FINOPS_ACCOUNT") {
        info!("Overriding account via ENV");
        config.account = Some(val);
    }
    if let Some(val) = lookup("FINOPS_REGION") {
        info!(old = %config.region, new = %val, "Overriding default region via ENV");
        config.region = val;
    }
    if let Some(val) = lookup("FINOPS_POSTURE") {
        match val.parse() {
            Ok(posture) => {
                info!(old = %config.posture, new = %posture, "Overriding posture via ENV");
                config.posture = posture;
            }
            Err(e) => warn!(error = %e, "Ignoring FINOPS_POSTURE"),
        }
    }
    if let Some(val) = lookup("FINOPS_ALLOWED_CIDR") {
        info!(new = %val, "Overriding dashboard ingress CIDR via ENV");
        config.dashboard.allowed_cidr = Some(val);
    }
    if let Some(val) = lookup("FINOPS_OUT_DIR") {
        info!(old = %config.out_dir, new = %val, "Overriding output directory via ENV");
        config.out_dir = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::project::Posture;
    use anyhow::Result;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_missing_config_is_reported() -> Result<()> {
        let dir = tempdir()?;
        let result = load_project_config(dir.path());
        assert!(matches!(result, Err(InfrastructureError::ConfigNotFound(_))));
        Ok(())
    }

    #[test]
    fn test_loads_and_validates() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("finops.yaml"),
            "name: atlas\naccount: '123456789012'\nregion: eu-west-1\n",
        )?;
        let config = load_project_config(dir.path())?;
        assert_eq!(config.name, "atlas");
        assert_eq!(config.region, "eu-west-1");
        Ok(())
    }

    #[test]
    fn test_structural_errors_fail_fast() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("finops_project.yaml"),
            "name: ''\nbilling_export:\n  retention_days: 99999\n",
        )?;
        let result = load_project_config(dir.path());
        assert!(matches!(result, Err(InfrastructureError::Validation(_))));
        Ok(())
    }

    #[test]
    fn test_env_overrides() -> Result<()> {
        let mut config: ProjectConfig = serde_yaml::from_str("name: atlas\n")?;
        let env: HashMap<&str, &str> = HashMap::from([
            ("FINOPS_ACCOUNT", "210987654321"),
            ("FINOPS_REGION", "eu-central-1"),
            ("FINOPS_POSTURE", "prod"),
            ("FINOPS_ALLOWED_CIDR", "10.0.0.0/8"),
        ]);

        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.account.as_deref(), Some("210987654321"));
        assert_eq!(config.region, "eu-central-1");
        assert_eq!(config.posture, Posture::Prod);
        assert_eq!(config.dashboard.allowed_cidr.as_deref(), Some("10.0.0.0/8"));
        assert_eq!(config.out_dir, "finops.out");
        Ok(())
    }

    #[test]
    fn test_unknown_posture_is_ignored() -> Result<()> {
        let mut config: ProjectConfig = serde_yaml::from_str("name: atlas\nposture: prod\n")?;
        apply_env_overrides(&mut config, |k| {
            (k == "FINOPS_POSTURE").then(|| "staging".to_string())
        });
        assert_eq!(config.posture, Posture::Prod);
        Ok(())
    }
}
