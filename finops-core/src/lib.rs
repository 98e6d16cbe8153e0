// finops-core/src/lib.rs

#![allow(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports: output contracts (template rendering)
pub mod ports;

// 2. Domain: billing export and dashboard records, resource graph, project settings.
// Depends on nothing else in the crate.
pub mod domain;

// 3. Infrastructure: config files, renderers, atomic writes
pub mod infrastructure;

// 4. Application: the two units, composition root, graph/teardown/clean use cases
pub mod application;

pub mod error;

pub use error::FinopsError;
