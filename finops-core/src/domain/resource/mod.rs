// finops-core/src/domain/resource/mod.rs

pub mod descriptor;
pub mod intrinsic;
pub mod removal;
pub mod template;

pub use descriptor::ResourceDescriptor;
pub use removal::RemovalPolicy;
pub use template::{StackOutput, StackTemplate, StackTemplateBuilder};
