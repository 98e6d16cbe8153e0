use serde_json::Value;

use crate::infrastructure::error::InfrastructureError;
use crate::ports::renderer::TemplateRenderer;

pub struct YamlRenderer;

impl TemplateRenderer for YamlRenderer {
    fn extension(&self) -> &'static str {
        "yaml"
    }

    fn render(&self, document: &Value) -> Result<String, InfrastructureError> {
        Ok(serde_yaml::to_string(document)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;

    #[test]
    fn test_renders_intrinsics_in_long_form() -> Result<()> {
        let doc = json!({ "Outputs": { "CurBucketName": { "Value": { "Ref": "CurBucket" } } } });
        let text = YamlRenderer.render(&doc)?;
        assert!(text.contains("Ref: CurBucket"));
        let back: Value = serde_yaml::from_str(&text)?;
        assert_eq!(back, doc);
        Ok(())
    }
}
