// finops-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(finops::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG / YAML ---
    #[error("YAML Error: {0}")]
    #[diagnostic(
        code(finops::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON Error: {0}")]
    #[diagnostic(code(finops::infra::json))]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid project configuration:\n{0}")]
    #[diagnostic(
        code(finops::infra::config_invalid),
        help("Fix the listed fields in finops.yaml.")
    )]
    Validation(#[from] validator::ValidationErrors),

    #[error("Project configuration not found at '{0}'")]
    #[diagnostic(code(finops::infra::config_missing))]
    ConfigNotFound(String),
}
