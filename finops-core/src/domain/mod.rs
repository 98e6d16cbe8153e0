// finops-core/src/domain/mod.rs

pub mod billing;
pub mod dashboard;
pub mod error;
pub mod graph;
pub mod ports;
pub mod project;
pub mod resource;

// Shorter imports for the other layers
pub use error::DomainError;
