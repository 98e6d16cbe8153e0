// finops-core/src/domain/dashboard/exposure.rs

use ipnetwork::IpNetwork;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::warn;

use super::credential::SecretInjection;
use crate::domain::error::DomainError;
use crate::domain::project::Posture;

pub const CONTAINER_PORT: u16 = 3000;
pub const LISTENER_PORT: u16 = 80;
/// Port of the analytics query engine the dashboard reads from.
pub const ANALYTICS_PORT: u16 = 5439;
pub const LOG_RETENTION_DAYS: u32 = 7;
pub const OPEN_CIDR: &str = "0.0.0.0/0";

const SENSITIVE_MARKERS: [&str; 4] = ["PASSWORD", "SECRET", "TOKEN", "API_KEY"];

// [registry[:port]/]path[:tag][@sha256:digest]
#[allow(clippy::expect_used)]
static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<repo>(?:[a-zA-Z0-9.-]+(?::\d+)?/)?[a-z0-9]+(?:[._-][a-z0-9]+)*(?:/[a-z0-9]+(?:[._-][a-z0-9]+)*)*)(?::(?P<tag>[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}))?(?:@(?P<digest>sha256:[a-f0-9]{64}))?$",
    )
    .expect("static image regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageReference {
    pub repository: String,
    pub tag: Option<String>,
    pub digest: Option<String>,
}

impl ImageReference {
    /// Syntax only. Whether the registry serves the image is decided when the
    /// task starts, and that failure belongs to the operator.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let caps = IMAGE_RE
            .captures(raw.trim())
            .ok_or_else(|| DomainError::InvalidImageReference(raw.to_string()))?;
        let repository = caps
            .name("repo")
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| DomainError::InvalidImageReference(raw.to_string()))?;
        Ok(Self {
            repository,
            tag: caps.name("tag").map(|m| m.as_str().to_string()),
            digest: caps.name("digest").map(|m| m.as_str().to_string()),
        })
    }

    pub fn is_pinned(&self) -> bool {
        self.tag.as_deref().is_some_and(|t| t != "latest") || self.digest.is_some()
    }
}

impl std::fmt::Display for ImageReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.repository)?;
        if let Some(tag) = &self.tag {
            write!(f, ":{}", tag)?;
        }
        if let Some(digest) = &self.digest {
            write!(f, "@{}", digest)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerSpec {
    pub image: ImageReference,
    pub port: u16,
    pub environment: BTreeMap<String, String>,
    pub secrets: Vec<SecretInjection>,
}

impl ContainerSpec {
    /// Credentials may only arrive through `secrets`; a literal environment
    /// entry shadowing a secret or looking like one is rejected.
    pub fn try_new(
        image: ImageReference,
        port: u16,
        environment: BTreeMap<String, String>,
        secrets: Vec<SecretInjection>,
    ) -> Result<Self, DomainError> {
        for name in environment.keys() {
            let shadows_secret = secrets.iter().any(|s| &s.env_name == name);
            let upper = name.to_uppercase();
            let looks_sensitive = SENSITIVE_MARKERS.iter().any(|m| upper.contains(m))
                || upper.ends_with("ADMIN_USER");
            if shadows_secret || looks_sensitive {
                return Err(DomainError::CredentialLeak(name.clone()));
            }
        }
        Ok(Self {
            image,
            port,
            environment,
            secrets,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngressRule {
    pub cidr: IpNetwork,
    pub port: u16,
}

impl IngressRule {
    /// True when the rule admits every source address.
    pub fn is_open(&self) -> bool {
        self.cidr.prefix() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EgressRule {
    pub cidr: IpNetwork,
    pub port: u16,
    pub description: String,
}

/// Parses the ingress allow-list entry, applying the posture's rule on open ingress.
pub fn resolve_ingress(
    allowed_cidr: Option<&str>,
    acknowledged: bool,
    posture: Posture,
) -> Result<IngressRule, DomainError> {
    let raw = allowed_cidr.unwrap_or(OPEN_CIDR);
    let cidr: IpNetwork = raw
        .parse()
        .map_err(|e| DomainError::InvalidCidr(format!("{}: {}", raw, e)))?;
    // EC2 refuses blocks with host bits such as 10.1.2.3/8.
    if cidr.ip() != cidr.network() {
        return Err(DomainError::InvalidCidr(format!(
            "{}: host bits set, did you mean {}/{}?",
            raw,
            cidr.network(),
            cidr.prefix()
        )));
    }
    let rule = IngressRule {
        cidr,
        port: LISTENER_PORT,
    };

    if rule.is_open() {
        if posture == Posture::Prod && !acknowledged {
            return Err(DomainError::OpenIngressNotAcknowledged(posture.to_string()));
        }
        warn!(
            cidr = %cidr,
            posture = %posture,
            "Dashboard load balancer is reachable from any address; restrict allowed_cidr for production"
        );
    }

    Ok(rule)
}

/// Task shape of the container service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskShape {
    pub cpu: u32,
    pub memory_mib: u32,
}

impl TaskShape {
    /// Only the CPU/memory pairs the serverless container target accepts.
    pub fn try_new(cpu: u32, memory_mib: u32) -> Result<Self, DomainError> {
        let allowed = match cpu {
            256 => matches!(memory_mib, 512 | 1024 | 2048),
            512 => (1024..=4096).contains(&memory_mib) && memory_mib % 1024 == 0,
            1024 => (2048..=8192).contains(&memory_mib) && memory_mib % 1024 == 0,
            2048 => (4096..=16384).contains(&memory_mib) && memory_mib % 1024 == 0,
            4096 => (8192..=30720).contains(&memory_mib) && memory_mib % 1024 == 0,
            _ => false,
        };
        if allowed {
            Ok(Self { cpu, memory_mib })
        } else {
            Err(DomainError::InvalidConfig(format!(
                "unsupported task shape: cpu {} with {} MiB",
                cpu, memory_mib
            )))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceExposure {
    pub container: ContainerSpec,
    pub listener_port: u16,
    pub shape: TaskShape,
    pub desired_count: u32,
    pub ingress: IngressRule,
    pub egress: Vec<EgressRule>,
    pub log_retention_days: u32,
}

impl ServiceExposure {
    pub fn try_new(
        container: ContainerSpec,
        shape: TaskShape,
        desired_count: u32,
        ingress: IngressRule,
    ) -> Result<Self, DomainError> {
        let anywhere: IpNetwork = OPEN_CIDR
            .parse()
            .map_err(|e| DomainError::InvalidCidr(format!("{}: {}", OPEN_CIDR, e)))?;
        Ok(Self {
            container,
            listener_port: LISTENER_PORT,
            shape,
            desired_count,
            ingress,
            egress: vec![EgressRule {
                cidr: anywhere,
                port: ANALYTICS_PORT,
                description: "Outbound to Redshift".to_string(),
            }],
            log_retention_days: LOG_RETENTION_DAYS,
        })
    }
}
