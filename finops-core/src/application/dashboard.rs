// finops-core/src/application/dashboard.rs
//
// USE CASE: Dashboard-Hosting Unit. Network, generated admin credential,
// container service behind a public load balancer, ingress/egress rules.

use ipnetwork::IpNetwork;
use serde_json::{Map, Value, json};
use tracing::{info, instrument, warn};

use super::iam::service_role;
use crate::domain::billing::AccessGrant;
use crate::domain::dashboard::credential::{PASSWORD_KEY, USERNAME_KEY};
use crate::domain::dashboard::exposure::CONTAINER_PORT;
use crate::domain::dashboard::{
    ContainerSpec, CredentialSecret, ImageReference, NetworkConfig, NewNetworkSpec,
    ServiceExposure, SubnetKind, TaskShape, resolve_ingress,
};
use crate::domain::error::DomainError;
use crate::domain::ports::StackSynthesizer;
use crate::domain::project::{AccountId, DashboardSettings, Posture, validate_region};
use crate::domain::resource::intrinsic::{REGION, get_att, get_azs, join, reference, select};
use crate::domain::resource::{RemovalPolicy, ResourceDescriptor, StackTemplate, StackTemplateBuilder};

pub const VPC_ID: &str = "AtlasVpc";
pub const SECRET_ID: &str = "GrafanaAdminSecret";
pub const CLUSTER_ID: &str = "GrafanaCluster";
pub const LOG_GROUP_ID: &str = "GrafanaLogs";
pub const EXECUTION_ROLE_ID: &str = "GrafanaTaskExecutionRole";
pub const TASK_ROLE_ID: &str = "GrafanaTaskRole";
pub const TASK_DEF_ID: &str = "GrafanaTaskDef";
pub const LB_SG_ID: &str = "GrafanaLBSecurityGroup";
pub const SERVICE_SG_ID: &str = "GrafanaServiceSecurityGroup";
pub const SERVICE_INGRESS_ID: &str = "GrafanaServiceIngressFromLB";
pub const LB_EGRESS_ID: &str = "GrafanaLBEgressToService";
pub const LB_ID: &str = "GrafanaLB";
pub const TARGET_GROUP_ID: &str = "GrafanaTargetGroup";
pub const LISTENER_ID: &str = "GrafanaListener";
pub const SERVICE_ID: &str = "GrafanaService";

pub const OUTPUT_URL: &str = "GrafanaURL";
pub const OUTPUT_SECRET_NAME: &str = "GrafanaAdminSecretName";

pub const CONTAINER_NAME: &str = "web";
const LOG_STREAM_PREFIX: &str = "grafana";
const HEALTH_CHECK_PATH: &str = "/api/health";
const HTTPS_PORT: u16 = 443;

#[derive(Debug, Clone)]
pub struct DashboardUnit {
    stack_name: String,
    account: AccountId,
    region: String,
    network: NetworkConfig,
    secret: CredentialSecret,
    exposure: ServiceExposure,
}

/// Subnet and VPC handles, literal for an existing network, references for a new one.
struct NetworkHandles {
    vpc_id: Value,
    public_subnets: Vec<Value>,
    private_subnets: Vec<Value>,
    /// Routes the load balancer and service must wait for.
    public_routes: Vec<String>,
    private_routes: Vec<String>,
}

impl DashboardUnit {
    #[instrument(skip(settings), fields(stack = %settings.stack_name))]
    pub fn new(
        settings: &DashboardSettings,
        account: &AccountId,
        default_region: &str,
        posture: Posture,
    ) -> Result<Self, DomainError> {
        let region = settings.region.as_deref().unwrap_or(default_region);
        validate_region(region)?;

        let network = NetworkConfig::resolve(
            settings.network.existing.as_ref(),
            settings.network.new.as_ref(),
        )?;

        let secret = CredentialSecret::try_new(&settings.secret_name, &settings.admin_username)?;

        let mut environment = settings.extra_environment.clone();
        environment.insert("GF_SERVER_ROOT_URL".to_string(), "/".to_string());
        environment.insert("GF_USERS_ALLOW_SIGN_UP".to_string(), "false".to_string());

        let container = ContainerSpec::try_new(
            ImageReference::parse(&settings.image)?,
            CONTAINER_PORT,
            environment,
            vec![
                secret.inject("GF_SECURITY_ADMIN_USER", USERNAME_KEY),
                secret.inject("GF_SECURITY_ADMIN_PASSWORD", PASSWORD_KEY),
            ],
        )?;
        if !container.image.is_pinned() {
            warn!(image = %container.image, "Dashboard image is not pinned to a tag or digest");
        }

        let ingress = resolve_ingress(
            settings.allowed_cidr.as_deref(),
            settings.acknowledge_open_ingress,
            posture,
        )?;

        let exposure = ServiceExposure::try_new(
            container,
            TaskShape::try_new(settings.cpu, settings.memory_mib)?,
            settings.desired_count,
            ingress,
        )?;

        info!(
            region = %region,
            ingress = %exposure.ingress.cidr,
            image = %exposure.container.image,
            "Dashboard unit ready"
        );

        Ok(Self {
            stack_name: settings.stack_name.clone(),
            account: account.clone(),
            region: region.to_string(),
            network,
            secret,
            exposure,
        })
    }

    pub fn exposure(&self) -> &ServiceExposure {
        &self.exposure
    }

    fn declare_network(
        &self,
        builder: &mut StackTemplateBuilder,
    ) -> Result<NetworkHandles, DomainError> {
        match &self.network {
            NetworkConfig::Existing(existing) => Ok(NetworkHandles {
                vpc_id: json!(existing.vpc_id),
                public_subnets: existing.public_subnet_ids.iter().map(|s| json!(s)).collect(),
                private_subnets: existing.private_subnet_ids.iter().map(|s| json!(s)).collect(),
                public_routes: Vec::new(),
                private_routes: Vec::new(),
            }),
            NetworkConfig::New(spec) => self.declare_new_network(builder, spec),
        }
    }

    fn declare_new_network(
        &self,
        builder: &mut StackTemplateBuilder,
        spec: &NewNetworkSpec,
    ) -> Result<NetworkHandles, DomainError> {
        let igw = format!("{VPC_ID}IGW");
        let attachment = format!("{VPC_ID}VPCGW");

        builder
            .add(
                ResourceDescriptor::new(VPC_ID, "AWS::EC2::VPC", RemovalPolicy::Delete)
                    .with_properties(json!({
                        "CidrBlock": spec.cidr.to_string(),
                        "EnableDnsHostnames": true,
                        "EnableDnsSupport": true,
                        "Tags": [{ "Key": "Name", "Value": format!("{}/{}", self.stack_name, VPC_ID) }],
                    })),
            )?
            .add(ResourceDescriptor::new(&igw, "AWS::EC2::InternetGateway", RemovalPolicy::Delete))?
            .add(
                ResourceDescriptor::new(&attachment, "AWS::EC2::VPCGatewayAttachment", RemovalPolicy::Delete)
                    .with_properties(json!({
                        "VpcId": reference(VPC_ID),
                        "InternetGatewayId": reference(&igw),
                    })),
            )?;

        let mut handles = NetworkHandles {
            vpc_id: reference(VPC_ID),
            public_subnets: Vec::new(),
            private_subnets: Vec::new(),
            public_routes: Vec::new(),
            private_routes: Vec::new(),
        };
        let mut nat_ids: Vec<String> = Vec::new();

        // Public subnets come first in the plan, so NAT ids exist before private routes need them.
        for subnet in spec.subnet_plan() {
            let (label, public) = match subnet.kind {
                SubnetKind::Public => ("Public", true),
                SubnetKind::Private => ("Private", false),
            };
            let base = format!("{VPC_ID}{label}Subnet{}", subnet.az_index + 1);
            let subnet_id = format!("{base}Subnet");
            let table_id = format!("{base}RouteTable");
            let assoc_id = format!("{base}RouteTableAssociation");
            let route_id = format!("{base}DefaultRoute");

            builder
                .add(
                    ResourceDescriptor::new(&subnet_id, "AWS::EC2::Subnet", RemovalPolicy::Delete)
                        .with_properties(json!({
                            "VpcId": reference(VPC_ID),
                            "CidrBlock": subnet.cidr.to_string(),
                            "AvailabilityZone": select(subnet.az_index, get_azs()),
                            "MapPublicIpOnLaunch": public,
                        })),
                )?
                .add(
                    ResourceDescriptor::new(&table_id, "AWS::EC2::RouteTable", RemovalPolicy::Delete)
                        .with_properties(json!({ "VpcId": reference(VPC_ID) })),
                )?
                .add(
                    ResourceDescriptor::new(
                        &assoc_id,
                        "AWS::EC2::SubnetRouteTableAssociation",
                        RemovalPolicy::Delete,
                    )
                    .with_properties(json!({
                        "RouteTableId": reference(&table_id),
                        "SubnetId": reference(&subnet_id),
                    })),
                )?;

            if public {
                builder.add(
                    ResourceDescriptor::new(&route_id, "AWS::EC2::Route", RemovalPolicy::Delete)
                        .with_properties(json!({
                            "RouteTableId": reference(&table_id),
                            "DestinationCidrBlock": "0.0.0.0/0",
                            "GatewayId": reference(&igw),
                        }))
                        .depends_on(&attachment),
                )?;

                if subnet.az_index < usize::from(spec.nat_gateways) {
                    let eip_id = format!("{base}EIP");
                    let nat_id = format!("{base}NATGateway");
                    builder
                        .add(
                            ResourceDescriptor::new(&eip_id, "AWS::EC2::EIP", RemovalPolicy::Delete)
                                .with_properties(json!({ "Domain": "vpc" })),
                        )?
                        .add(
                            ResourceDescriptor::new(&nat_id, "AWS::EC2::NatGateway", RemovalPolicy::Delete)
                                .with_properties(json!({
                                    "SubnetId": reference(&subnet_id),
                                    "AllocationId": get_att(&eip_id, "AllocationId"),
                                }))
                                .depends_on(&route_id)
                                .depends_on(&assoc_id),
                        )?;
                    nat_ids.push(nat_id);
                }
                handles.public_subnets.push(reference(&subnet_id));
                handles.public_routes.push(route_id);
            } else {
                let nat = nat_ids
                    .get(subnet.az_index % nat_ids.len().max(1))
                    .cloned()
                    .ok_or_else(|| {
                        DomainError::InvalidConfig("a new network needs at least one NAT gateway".into())
                    })?;
                builder.add(
                    ResourceDescriptor::new(&route_id, "AWS::EC2::Route", RemovalPolicy::Delete)
                        .with_properties(json!({
                            "RouteTableId": reference(&table_id),
                            "DestinationCidrBlock": "0.0.0.0/0",
                            "NatGatewayId": reference(&nat),
                        })),
                )?;
                handles.private_subnets.push(reference(&subnet_id));
                handles.private_routes.push(route_id);
            }
        }

        Ok(handles)
    }

    fn task_definition(&self) -> ResourceDescriptor {
        let container = &self.exposure.container;

        let environment: Vec<Value> = container
            .environment
            .iter()
            .map(|(name, value)| json!({ "Name": name, "Value": value }))
            .collect();

        // ECS resolves `secret-arn:json-key:version-stage:version-id` at task start.
        let secrets: Vec<Value> = container
            .secrets
            .iter()
            .map(|s| {
                json!({
                    "Name": s.env_name,
                    "ValueFrom": join(":", vec![reference(SECRET_ID), json!(s.json_key), json!(""), json!("")]),
                })
            })
            .collect();

        ResourceDescriptor::new(TASK_DEF_ID, "AWS::ECS::TaskDefinition", RemovalPolicy::Delete)
            .with_properties(json!({
                "Family": format!("{}-grafana", self.stack_name),
                "Cpu": self.exposure.shape.cpu.to_string(),
                "Memory": self.exposure.shape.memory_mib.to_string(),
                "NetworkMode": "awsvpc",
                "RequiresCompatibilities": ["FARGATE"],
                "ExecutionRoleArn": get_att(EXECUTION_ROLE_ID, "Arn"),
                "TaskRoleArn": get_att(TASK_ROLE_ID, "Arn"),
                "ContainerDefinitions": [{
                    "Name": CONTAINER_NAME,
                    "Image": container.image.to_string(),
                    "Essential": true,
                    "PortMappings": [{ "ContainerPort": container.port, "Protocol": "tcp" }],
                    "Environment": environment,
                    "Secrets": secrets,
                    "LogConfiguration": {
                        "LogDriver": "awslogs",
                        "Options": {
                            "awslogs-group": reference(LOG_GROUP_ID),
                            "awslogs-stream-prefix": LOG_STREAM_PREFIX,
                            "awslogs-region": reference(REGION),
                        },
                    },
                }],
            }))
    }

    fn security_groups(&self, vpc_id: &Value) -> Vec<ResourceDescriptor> {
        let ingress = &self.exposure.ingress;
        let mut lb_rule = cidr_rule(&ingress.cidr, ingress.port, "Allow HTTP access");
        lb_rule.insert("IpProtocol".into(), json!("tcp"));

        let mut service_egress: Vec<Value> = self
            .exposure
            .egress
            .iter()
            .map(|rule| tcp_rule(&rule.cidr, rule.port, &rule.description))
            .collect();
        // Image pulls and secret retrieval go through public endpoints.
        if let Some(anywhere) = self.exposure.egress.first().map(|r| r.cidr) {
            service_egress.push(tcp_rule(&anywhere, HTTPS_PORT, "Registry and secret store"));
        }

        vec![
            ResourceDescriptor::new(LB_SG_ID, "AWS::EC2::SecurityGroup", RemovalPolicy::Delete)
                .with_properties(json!({
                    "GroupDescription": format!("{} load balancer", self.stack_name),
                    "VpcId": vpc_id,
                    "SecurityGroupIngress": [Value::Object(lb_rule)],
                    // Placeholder rule that matches nothing, so only the explicit egress below applies.
                    "SecurityGroupEgress": [{
                        "CidrIp": "255.255.255.255/32",
                        "IpProtocol": "icmp",
                        "FromPort": 252,
                        "ToPort": 86,
                        "Description": "Disallow all traffic",
                    }],
                })),
            ResourceDescriptor::new(SERVICE_SG_ID, "AWS::EC2::SecurityGroup", RemovalPolicy::Delete)
                .with_properties(json!({
                    "GroupDescription": format!("{} dashboard service", self.stack_name),
                    "VpcId": vpc_id,
                    "SecurityGroupEgress": service_egress,
                })),
            ResourceDescriptor::new(SERVICE_INGRESS_ID, "AWS::EC2::SecurityGroupIngress", RemovalPolicy::Delete)
                .with_properties(json!({
                    "GroupId": get_att(SERVICE_SG_ID, "GroupId"),
                    "SourceSecurityGroupId": get_att(LB_SG_ID, "GroupId"),
                    "IpProtocol": "tcp",
                    "FromPort": self.exposure.container.port,
                    "ToPort": self.exposure.container.port,
                    "Description": "Load balancer to target",
                })),
            ResourceDescriptor::new(LB_EGRESS_ID, "AWS::EC2::SecurityGroupEgress", RemovalPolicy::Delete)
                .with_properties(json!({
                    "GroupId": get_att(LB_SG_ID, "GroupId"),
                    "DestinationSecurityGroupId": get_att(SERVICE_SG_ID, "GroupId"),
                    "IpProtocol": "tcp",
                    "FromPort": self.exposure.container.port,
                    "ToPort": self.exposure.container.port,
                    "Description": "Load balancer to target",
                })),
        ]
    }
}

fn cidr_rule(cidr: &IpNetwork, port: u16, description: &str) -> Map<String, Value> {
    let mut rule = Map::new();
    match cidr {
        IpNetwork::V4(_) => rule.insert("CidrIp".into(), json!(cidr.to_string())),
        IpNetwork::V6(_) => rule.insert("CidrIpv6".into(), json!(cidr.to_string())),
    };
    rule.insert("FromPort".into(), json!(port));
    rule.insert("ToPort".into(), json!(port));
    rule.insert("Description".into(), json!(description));
    rule
}

fn tcp_rule(cidr: &IpNetwork, port: u16, description: &str) -> Value {
    let mut rule = cidr_rule(cidr, port, description);
    rule.insert("IpProtocol".into(), json!("tcp"));
    Value::Object(rule)
}

impl StackSynthesizer for DashboardUnit {
    fn stack_name(&self) -> &str {
        &self.stack_name
    }

    #[instrument(skip(self), fields(stack = %self.stack_name))]
    fn synthesize(&self) -> Result<StackTemplate, DomainError> {
        let mut builder = StackTemplate::builder(&self.stack_name, self.account.as_str(), &self.region)
            .description("Self-hosted Grafana on a serverless container service behind a load balancer");

        let network = self.declare_network(&mut builder)?;

        let execution_grants = [
            AccessGrant::allow(
                &["logs:CreateLogStream", "logs:PutLogEvents"],
                vec![get_att(LOG_GROUP_ID, "Arn")],
            ),
            AccessGrant::allow(
                &["secretsmanager:GetSecretValue", "secretsmanager:DescribeSecret"],
                vec![reference(SECRET_ID)],
            ),
        ];

        builder
            .add(
                ResourceDescriptor::new(SECRET_ID, "AWS::SecretsManager::Secret", self.secret.removal)
                    .with_properties(self.secret.generate_properties()),
            )?
            .add(ResourceDescriptor::new(CLUSTER_ID, "AWS::ECS::Cluster", RemovalPolicy::Delete))?
            .add(
                ResourceDescriptor::new(LOG_GROUP_ID, "AWS::Logs::LogGroup", RemovalPolicy::Delete)
                    .with_properties(json!({ "RetentionInDays": self.exposure.log_retention_days })),
            )?
            .add(service_role(
                EXECUTION_ROLE_ID,
                "ecs-tasks.amazonaws.com",
                &[],
                Some(("GrafanaTaskExecution", &execution_grants[..])),
            ))?
            .add(service_role(TASK_ROLE_ID, "ecs-tasks.amazonaws.com", &[], None))?
            .add(self.task_definition())?;

        for group in self.security_groups(&network.vpc_id) {
            builder.add(group)?;
        }

        let mut load_balancer = ResourceDescriptor::new(
            LB_ID,
            "AWS::ElasticLoadBalancingV2::LoadBalancer",
            RemovalPolicy::Delete,
        )
        .with_properties(json!({
            "Scheme": "internet-facing",
            "Type": "application",
            "Subnets": network.public_subnets,
            "SecurityGroups": [get_att(LB_SG_ID, "GroupId")],
            "LoadBalancerAttributes": [{ "Key": "deletion_protection.enabled", "Value": "false" }],
        }));
        for route in &network.public_routes {
            load_balancer = load_balancer.depends_on(route);
        }

        let mut service = ResourceDescriptor::new(SERVICE_ID, "AWS::ECS::Service", RemovalPolicy::Delete)
            .with_properties(json!({
                "Cluster": reference(CLUSTER_ID),
                "LaunchType": "FARGATE",
                "DesiredCount": self.exposure.desired_count,
                "TaskDefinition": reference(TASK_DEF_ID),
                "HealthCheckGracePeriodSeconds": 60,
                "DeploymentConfiguration": { "MaximumPercent": 200, "MinimumHealthyPercent": 50 },
                "LoadBalancers": [{
                    "ContainerName": CONTAINER_NAME,
                    "ContainerPort": self.exposure.container.port,
                    "TargetGroupArn": reference(TARGET_GROUP_ID),
                }],
                "NetworkConfiguration": {
                    "AwsvpcConfiguration": {
                        "AssignPublicIp": "DISABLED",
                        "SecurityGroups": [get_att(SERVICE_SG_ID, "GroupId")],
                        "Subnets": network.private_subnets,
                    },
                },
            }))
            // The target group must be attached to a listener before the service registers targets.
            .depends_on(LISTENER_ID);
        for route in &network.private_routes {
            service = service.depends_on(route);
        }

        builder
            .add(load_balancer)?
            .add(
                ResourceDescriptor::new(
                    TARGET_GROUP_ID,
                    "AWS::ElasticLoadBalancingV2::TargetGroup",
                    RemovalPolicy::Delete,
                )
                .with_properties(json!({
                    "Port": self.exposure.container.port,
                    "Protocol": "HTTP",
                    "TargetType": "ip",
                    "VpcId": network.vpc_id,
                    "HealthCheckPath": HEALTH_CHECK_PATH,
                })),
            )?
            .add(
                ResourceDescriptor::new(
                    LISTENER_ID,
                    "AWS::ElasticLoadBalancingV2::Listener",
                    RemovalPolicy::Delete,
                )
                .with_properties(json!({
                    "LoadBalancerArn": reference(LB_ID),
                    "Port": self.exposure.listener_port,
                    "Protocol": "HTTP",
                    "DefaultActions": [{ "Type": "forward", "TargetGroupArn": reference(TARGET_GROUP_ID) }],
                })),
            )?
            .add(service)?;

        builder
            .output(
                OUTPUT_URL,
                join("", vec![json!("http://"), get_att(LB_ID, "DNSName")]),
                Some("Dashboard endpoint"),
            )
            .output(
                OUTPUT_SECRET_NAME,
                json!(self.secret.name),
                Some("Secret holding the dashboard admin credentials"),
            );

        builder.build()
    }
}
