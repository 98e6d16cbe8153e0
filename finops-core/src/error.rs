// finops-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum FinopsError {
    // --- DOMAIN (security invariants, graph, configuration semantics) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE (IO, parsing, structural validation) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Infrastructure(#[from] InfrastructureError),

    #[error("Unsafe path traversal detected: {0}")]
    #[diagnostic(
        code(finops::unsafe_path),
        help("out-dir must be a relative path inside the project directory.")
    )]
    UnsafePath(String),
}

impl From<std::io::Error> for FinopsError {
    fn from(err: std::io::Error) -> Self {
        FinopsError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl From<serde_json::Error> for FinopsError {
    fn from(err: serde_json::Error) -> Self {
        FinopsError::Infrastructure(InfrastructureError::JsonError(err))
    }
}
