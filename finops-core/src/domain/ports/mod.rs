// finops-core/src/domain/ports/mod.rs

pub mod stack;

pub use stack::StackSynthesizer;
