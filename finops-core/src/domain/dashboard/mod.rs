// finops-core/src/domain/dashboard/mod.rs

pub mod credential;
pub mod exposure;
pub mod network;

pub use credential::{CredentialSecret, SecretInjection};
pub use exposure::{
    ContainerSpec, EgressRule, ImageReference, IngressRule, ServiceExposure, TaskShape,
    resolve_ingress,
};
pub use network::{ExistingNetwork, NetworkConfig, NewNetworkSpec, SubnetKind, SubnetPlan};
