// finops-core/src/ports/renderer.rs

// The output side of synthesis: how a rendered template document becomes text
// on disk. The domain produces the document, adapters pick the syntax.

use crate::infrastructure::error::InfrastructureError;
use serde_json::Value;

pub trait TemplateRenderer: Send + Sync {
    /// File extension without the dot (`json`, `yaml`).
    fn extension(&self) -> &'static str;

    fn render(&self, document: &Value) -> Result<String, InfrastructureError>;
}
