// finops-core/src/application/app.rs
//
// Composition root: one project file in, one cloud assembly out.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, instrument};

use super::billing_export::BillingExportUnit;
use super::dashboard::DashboardUnit;
use crate::domain::dashboard::IngressRule;
use crate::domain::error::DomainError;
use crate::domain::ports::StackSynthesizer;
use crate::domain::project::{AccountId, ProjectConfig, validate_region};
use crate::domain::resource::StackTemplate;
use crate::error::FinopsError;
use crate::infrastructure::fs::atomic_write;
use crate::ports::TemplateRenderer;

pub const MANIFEST_FILE: &str = "manifest.json";
const ASSEMBLY_VERSION: &str = "1.0";

pub struct App {
    name: String,
    dashboard_ingress: Option<IngressRule>,
    stacks: Vec<Box<dyn StackSynthesizer>>,
}

impl App {
    /// Builds every enabled unit. Any invariant violation fails here, before
    /// a single template is rendered.
    #[instrument(skip(config), fields(project = %config.name))]
    pub fn from_config(config: &ProjectConfig) -> Result<Self, FinopsError> {
        let raw_account = config
            .account
            .as_deref()
            .ok_or_else(|| DomainError::InvalidAccountId("<unset>".to_string()))?;
        let account = AccountId::parse(raw_account)?;
        validate_region(&config.region)?;

        let mut stacks: Vec<Box<dyn StackSynthesizer>> = Vec::new();
        let mut dashboard_ingress = None;
        if config.billing_export.enabled {
            stacks.push(Box::new(BillingExportUnit::new(&config.billing_export, &account)?));
        }
        if config.dashboard.enabled {
            let unit = DashboardUnit::new(
                &config.dashboard,
                &account,
                &config.region,
                config.posture,
            )?;
            dashboard_ingress = Some(unit.exposure().ingress.clone());
            stacks.push(Box::new(unit));
        }

        info!(stacks = stacks.len(), posture = %config.posture, "App composed");
        Ok(Self {
            name: config.name.clone(),
            dashboard_ingress,
            stacks,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved load balancer ingress, if the dashboard is enabled.
    pub fn dashboard_ingress(&self) -> Option<&IngressRule> {
        self.dashboard_ingress.as_ref()
    }

    pub fn stack_names(&self) -> Vec<&str> {
        self.stacks.iter().map(|s| s.stack_name()).collect()
    }

    #[instrument(skip(self), fields(project = %self.name))]
    pub fn synthesize(&self) -> Result<CloudAssembly, FinopsError> {
        let templates = self
            .stacks
            .iter()
            .map(|s| s.synthesize())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CloudAssembly {
            project: self.name.clone(),
            templates,
        })
    }

    pub fn synthesize_stack(&self, stack_name: &str) -> Result<StackTemplate, FinopsError> {
        let stack = self
            .stacks
            .iter()
            .find(|s| s.stack_name() == stack_name)
            .ok_or_else(|| DomainError::StackNotFound(stack_name.to_string()))?;
        Ok(stack.synthesize()?)
    }
}

/// One row of the outputs surface.
#[derive(Debug, Clone, Serialize)]
pub struct OutputEntry {
    pub stack: String,
    pub key: String,
    pub value: Value,
    pub description: Option<String>,
}

/// Every synthesized template of one run.
#[derive(Debug, Clone)]
pub struct CloudAssembly {
    pub project: String,
    pub templates: Vec<StackTemplate>,
}

impl CloudAssembly {
    pub fn stack(&self, name: &str) -> Option<&StackTemplate> {
        self.templates.iter().find(|t| t.stack_name == name)
    }

    /// Narrows the assembly to one stack.
    pub fn select(self, name: &str) -> Result<Self, FinopsError> {
        let template = self
            .templates
            .into_iter()
            .find(|t| t.stack_name == name)
            .ok_or_else(|| DomainError::StackNotFound(name.to_string()))?;
        Ok(Self {
            project: self.project,
            templates: vec![template],
        })
    }

    pub fn outputs(&self) -> Vec<OutputEntry> {
        self.templates
            .iter()
            .flat_map(|t| {
                t.outputs.iter().map(|o| OutputEntry {
                    stack: t.stack_name.clone(),
                    key: o.key.clone(),
                    value: o.value.clone(),
                    description: o.description.clone(),
                })
            })
            .collect()
    }

    pub fn template_file_name(template: &StackTemplate, renderer: &dyn TemplateRenderer) -> String {
        format!("{}.template.{}", template.stack_name, renderer.extension())
    }

    pub fn manifest(&self, renderer: &dyn TemplateRenderer) -> Value {
        let artifacts: serde_json::Map<String, Value> = self
            .templates
            .iter()
            .map(|t| {
                (
                    t.stack_name.clone(),
                    json!({
                        "type": "aws:cloudformation:stack",
                        "environment": format!("aws://{}/{}", t.account, t.region),
                        "properties": {
                            "templateFile": Self::template_file_name(t, renderer),
                        },
                        "resources": t.resources.len(),
                    }),
                )
            })
            .collect();

        json!({
            "version": ASSEMBLY_VERSION,
            "project": self.project,
            "synthesizedAt": chrono::Utc::now().to_rfc3339(),
            "artifacts": artifacts,
        })
    }

    /// Writes every template, then the manifest, and returns the paths written.
    #[instrument(skip(self, renderer), fields(out_dir = %out_dir.display()))]
    pub fn write(
        &self,
        out_dir: &Path,
        renderer: &dyn TemplateRenderer,
    ) -> Result<Vec<PathBuf>, FinopsError> {
        let mut written = Vec::with_capacity(self.templates.len() + 1);

        for template in &self.templates {
            let path = out_dir.join(Self::template_file_name(template, renderer));
            let body = renderer.render(&template.to_cloudformation())?;
            atomic_write(&path, body)?;
            info!(stack = %template.stack_name, path = %path.display(), "Template written");
            written.push(path);
        }

        let manifest_path = out_dir.join(MANIFEST_FILE);
        let mut manifest = serde_json::to_string_pretty(&self.manifest(renderer))?;
        manifest.push('\n');
        atomic_write(&manifest_path, manifest)?;
        written.push(manifest_path);

        Ok(written)
    }
}
