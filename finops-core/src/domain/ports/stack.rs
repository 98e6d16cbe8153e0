use crate::domain::error::DomainError;
use crate::domain::resource::StackTemplate;

/// A declarative unit that renders itself into one stack template.
pub trait StackSynthesizer: Send + Sync {
    fn stack_name(&self) -> &str;

    fn synthesize(&self) -> Result<StackTemplate, DomainError>;
}
