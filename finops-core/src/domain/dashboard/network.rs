// finops-core/src/domain/dashboard/network.rs

use ipnetwork::Ipv4Network;
use serde::Serialize;
use std::net::Ipv4Addr;

use crate::domain::error::DomainError;
use crate::domain::project::configuration::{ExistingNetworkSettings, NewNetworkSettings};

const MAX_AZS: u8 = 6;

/// Where the dashboard runs. Exactly one variant, chosen at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NetworkConfig {
    Existing(ExistingNetwork),
    New(NewNetworkSpec),
}

impl NetworkConfig {
    pub fn resolve(
        existing: Option<&ExistingNetworkSettings>,
        new: Option<&NewNetworkSettings>,
    ) -> Result<Self, DomainError> {
        match (existing, new) {
            (Some(_), Some(_)) => Err(DomainError::NetworkSelection(
                "both an existing network and a new network were supplied".into(),
            )),
            (None, None) => Err(DomainError::NetworkSelection(
                "neither an existing network nor a new network was supplied".into(),
            )),
            (Some(existing), None) => ExistingNetwork::try_new(existing).map(Self::Existing),
            (None, Some(new)) => NewNetworkSpec::try_new(new).map(Self::New),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExistingNetwork {
    pub vpc_id: String,
    pub public_subnet_ids: Vec<String>,
    pub private_subnet_ids: Vec<String>,
}

impl ExistingNetwork {
    pub fn try_new(settings: &ExistingNetworkSettings) -> Result<Self, DomainError> {
        check_id("vpc", &settings.vpc_id)?;
        // A public load balancer spans at least two zones.
        if settings.public_subnet_ids.len() < 2 {
            return Err(DomainError::NetworkSelection(format!(
                "existing network '{}' needs at least 2 public subnets for the load balancer",
                settings.vpc_id
            )));
        }
        if settings.private_subnet_ids.is_empty() {
            return Err(DomainError::NetworkSelection(format!(
                "existing network '{}' needs at least 1 private subnet for the service",
                settings.vpc_id
            )));
        }
        for id in settings
            .public_subnet_ids
            .iter()
            .chain(&settings.private_subnet_ids)
        {
            check_id("subnet", id)?;
        }

        Ok(Self {
            vpc_id: settings.vpc_id.clone(),
            public_subnet_ids: settings.public_subnet_ids.clone(),
            private_subnet_ids: settings.private_subnet_ids.clone(),
        })
    }
}

fn check_id(kind: &str, id: &str) -> Result<(), DomainError> {
    let valid = id
        .strip_prefix(kind)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|hex| {
            (8..=17).contains(&hex.len()) && hex.chars().all(|c| c.is_ascii_hexdigit())
        });
    if valid {
        Ok(())
    } else {
        Err(DomainError::NetworkSelection(format!(
            "'{}' is not a valid {} id",
            id, kind
        )))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubnetKind {
    Public,
    Private,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubnetPlan {
    pub kind: SubnetKind,
    pub az_index: usize,
    pub cidr: Ipv4Network,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewNetworkSpec {
    pub cidr: Ipv4Network,
    pub max_azs: u8,
    pub nat_gateways: u8,
}

impl NewNetworkSpec {
    pub fn try_new(settings: &NewNetworkSettings) -> Result<Self, DomainError> {
        let cidr: Ipv4Network = settings
            .cidr
            .parse()
            .map_err(|e| DomainError::InvalidCidr(format!("{}: {}", settings.cidr, e)))?;

        if !(1..=MAX_AZS).contains(&settings.max_azs) {
            return Err(DomainError::InvalidConfig(format!(
                "max_azs must be between 1 and {}, got {}",
                MAX_AZS, settings.max_azs
            )));
        }
        if settings.nat_gateways == 0 || settings.nat_gateways > settings.max_azs {
            return Err(DomainError::InvalidConfig(format!(
                "nat_gateways must be between 1 and max_azs ({}), got {}",
                settings.max_azs, settings.nat_gateways
            )));
        }

        let spec = Self {
            // Normalize 10.0.3.0/16 to 10.0.0.0/16.
            cidr: Ipv4Network::new(cidr.network(), cidr.prefix())
                .map_err(|e| DomainError::InvalidCidr(e.to_string()))?,
            max_azs: settings.max_azs,
            nat_gateways: settings.nat_gateways,
        };
        if spec.subnet_prefix() > 28 {
            return Err(DomainError::InvalidCidr(format!(
                "{} is too small for {} zones",
                spec.cidr, spec.max_azs
            )));
        }
        Ok(spec)
    }

    fn subnet_count(&self) -> usize {
        usize::from(self.max_azs) * 2
    }

    fn subnet_prefix(&self) -> u8 {
        let count = self.subnet_count() as u32;
        let bits = u32::BITS - (count - 1).leading_zeros();
        self.cidr.prefix() + bits as u8
    }

    /// Carves equal-sized subnets: all public subnets first, then private ones.
    pub fn subnet_plan(&self) -> Vec<SubnetPlan> {
        let prefix = self.subnet_prefix();
        let base = u32::from(self.cidr.network());
        let block = 1u32 << (32 - u32::from(prefix));
        let azs = usize::from(self.max_azs);

        (0..self.subnet_count())
            .filter_map(|i| {
                let addr = Ipv4Addr::from(base + block * i as u32);
                let cidr = Ipv4Network::new(addr, prefix).ok()?;
                let (kind, az_index) = if i < azs {
                    (SubnetKind::Public, i)
                } else {
                    (SubnetKind::Private, i - azs)
                };
                Some(SubnetPlan {
                    kind,
                    az_index,
                    cidr,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn existing() -> ExistingNetworkSettings {
        ExistingNetworkSettings {
            vpc_id: "vpc-0abc1234".into(),
            public_subnet_ids: vec!["subnet-0aaa1111".into(), "subnet-0bbb2222".into()],
            private_subnet_ids: vec!["subnet-0ccc3333".into()],
        }
    }

    #[test]
    fn test_exactly_one_network() -> Result<()> {
        let new = NewNetworkSettings::default();
        let ex = existing();

        assert!(matches!(
            NetworkConfig::resolve(Some(&ex), Some(&new)),
            Err(DomainError::NetworkSelection(_))
        ));
        assert!(matches!(
            NetworkConfig::resolve(None, None),
            Err(DomainError::NetworkSelection(_))
        ));
        assert!(matches!(
            NetworkConfig::resolve(Some(&ex), None)?,
            NetworkConfig::Existing(_)
        ));
        assert!(matches!(
            NetworkConfig::resolve(None, Some(&new))?,
            NetworkConfig::New(_)
        ));
        Ok(())
    }

    #[test]
    fn test_existing_network_validation() {
        let mut bad_vpc = existing();
        bad_vpc.vpc_id = "network-1".into();
        assert!(ExistingNetwork::try_new(&bad_vpc).is_err());

        let mut single_public = existing();
        single_public.public_subnet_ids.truncate(1);
        assert!(ExistingNetwork::try_new(&single_public).is_err());

        let mut no_private = existing();
        no_private.private_subnet_ids.clear();
        assert!(ExistingNetwork::try_new(&no_private).is_err());
    }

    #[test]
    fn test_default_subnet_plan() -> Result<()> {
        let spec = NewNetworkSpec::try_new(&NewNetworkSettings::default())?;
        let plan: Vec<String> = spec
            .subnet_plan()
            .iter()
            .map(|s| format!("{:?}/{}/{}", s.kind, s.az_index, s.cidr))
            .collect();
        assert_eq!(
            plan,
            vec![
                "Public/0/10.0.0.0/18",
                "Public/1/10.0.64.0/18",
                "Private/0/10.0.128.0/18",
                "Private/1/10.0.192.0/18",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_three_zones_use_slash_19() -> Result<()> {
        let spec = NewNetworkSpec::try_new(&NewNetworkSettings {
            cidr: "10.1.0.0/16".into(),
            max_azs: 3,
            nat_gateways: 3,
        })?;
        let plan = spec.subnet_plan();
        assert_eq!(plan.len(), 6);
        assert!(plan.iter().all(|s| s.cidr.prefix() == 19));
        assert_eq!(plan[3].cidr.to_string(), "10.1.96.0/19");
        assert_eq!(plan[3].kind, SubnetKind::Private);
        Ok(())
    }

    #[test]
    fn test_nat_gateway_bounds() {
        let too_many = NewNetworkSettings {
            nat_gateways: 3,
            ..NewNetworkSettings::default()
        };
        assert!(NewNetworkSpec::try_new(&too_many).is_err());

        let bad_cidr = NewNetworkSettings {
            cidr: "10.0.0.0/33".into(),
            ..NewNetworkSettings::default()
        };
        assert!(matches!(
            NewNetworkSpec::try_new(&bad_cidr),
            Err(DomainError::InvalidCidr(_))
        ));
    }
}
