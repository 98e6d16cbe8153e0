// finops-core/src/ports/mod.rs

pub mod renderer;

pub use renderer::TemplateRenderer;
