// finops-core/src/infrastructure/renderer/mod.rs

pub mod json;
pub mod yaml;

pub use json::JsonRenderer;
pub use yaml::YamlRenderer;

use crate::ports::renderer::TemplateRenderer;

/// Output syntax of synthesized templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn renderer(&self) -> Box<dyn TemplateRenderer> {
        match self {
            Self::Json => Box::new(JsonRenderer),
            Self::Yaml => Box::new(YamlRenderer),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}
