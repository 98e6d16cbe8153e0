// finops-core/src/application/clean.rs

use crate::error::FinopsError;
use crate::infrastructure::config::project::load_project_config;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Removes the synthesis output directory. Returns the removed path, if any.
pub fn clean_project(project_dir: &Path) -> Result<Option<PathBuf>, FinopsError> {
    tracing::info!("🧹 Removing synthesized assembly...");

    let config = load_project_config(project_dir)?;
    let out_dir = resolve_out_dir(project_dir, &config.out_dir)?;

    if !out_dir.exists() {
        return Ok(None);
    }
    if out_dir.is_dir() {
        fs::remove_dir_all(&out_dir)?;
    } else {
        fs::remove_file(&out_dir)?;
    }
    println!("   🗑️  Assembly removed: {}", config.out_dir);
    Ok(Some(out_dir))
}

/// `out_dir` joined to the project directory. Absolute paths, parent
/// components and the project root itself are refused.
pub fn resolve_out_dir(project_dir: &Path, out_dir: &str) -> Result<PathBuf, FinopsError> {
    let relative = Path::new(out_dir);
    let mut has_normal = false;
    for component in relative.components() {
        match component {
            Component::Normal(_) => has_normal = true,
            Component::CurDir => {}
            _ => return Err(FinopsError::UnsafePath(out_dir.to_string())),
        }
    }
    if !has_normal {
        return Err(FinopsError::UnsafePath(out_dir.to_string()));
    }
    Ok(project_dir.join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_clean_removes_out_dir() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("finops.yaml"), "name: atlas\nout-dir: build/cdk\n")?;
        let out = dir.path().join("build/cdk");
        fs::create_dir_all(&out)?;
        fs::write(out.join("manifest.json"), "{}")?;

        assert_eq!(clean_project(dir.path())?, Some(out.clone()));
        assert!(!out.exists());
        assert!(dir.path().join("finops.yaml").exists());

        // Second run is a no-op.
        assert_eq!(clean_project(dir.path())?, None);
        Ok(())
    }

    #[test]
    fn test_traversal_is_refused() -> Result<()> {
        let dir = tempdir()?;
        for bad in ["../outside", "/tmp/abs", ".", "", "out/../.."] {
            assert!(
                matches!(resolve_out_dir(dir.path(), bad), Err(FinopsError::UnsafePath(_))),
                "{bad} should be refused"
            );
        }
        assert_eq!(resolve_out_dir(dir.path(), "./finops.out")?, dir.path().join("./finops.out"));
        Ok(())
    }
}
