use serde_json::Value;

use crate::infrastructure::error::InfrastructureError;
use crate::ports::renderer::TemplateRenderer;

pub struct JsonRenderer;

impl TemplateRenderer for JsonRenderer {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn render(&self, document: &Value) -> Result<String, InfrastructureError> {
        let mut text = serde_json::to_string_pretty(document)?;
        text.push('\n');
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;

    #[test]
    fn test_key_order_is_preserved() -> Result<()> {
        let doc = json!({ "AWSTemplateFormatVersion": "2010-09-09", "Description": "d", "Resources": {} });
        let text = JsonRenderer.render(&doc)?;
        let version = text.find("AWSTemplateFormatVersion").unwrap_or(usize::MAX);
        let resources = text.find("Resources").unwrap_or(0);
        assert!(version < resources);
        assert!(text.ends_with("}\n"));
        Ok(())
    }
}
