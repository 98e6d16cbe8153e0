use anyhow::{Context, Result};
use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const BILLING_STACK: &str = "AtlasStudioFinOps-CUR";
const DASHBOARD_STACK: &str = "AtlasStudioFinOps-Grafana";

/// A private copy of the demo project, so each test can edit and synthesize freely.
struct FinopsTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl FinopsTestEnv {
    fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let project_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .context("Workspace root not found")?
            .join("demos/atlas_finops");

        let dest = tmp.path().join("atlas_finops");
        Self::copy_dir(&project_root, &dest)?;

        Ok(Self {
            _tmp: tmp,
            root: dest,
        })
    }

    fn copy_dir(src: &Path, dst: &Path) -> std::io::Result<()> {
        let mut options = fs_extra::dir::CopyOptions::new();
        options.skip_exist = true;
        options.content_only = true;

        std::fs::create_dir_all(dst)?;
        fs_extra::dir::copy(src, dst, &options)
            .map(|_| ())
            .map_err(|e| std::io::Error::other(e.to_string()))
    }

    fn finops(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("finops"));
        cmd.current_dir(&self.root);
        for key in [
            "FINOPS_ACCOUNT",
            "FINOPS_REGION",
            "FINOPS_POSTURE",
            "FINOPS_ALLOWED_CIDR",
            "FINOPS_OUT_DIR",
            "RUST_LOG",
        ] {
            cmd.env_remove(key);
        }
        cmd
    }

    fn edit_config(&self, edit: impl FnOnce(String) -> String) -> Result<()> {
        let path = self.root.join("finops.yaml");
        let content = std::fs::read_to_string(&path)?;
        std::fs::write(&path, edit(content))?;
        Ok(())
    }

    fn out_dir(&self) -> PathBuf {
        self.root.join("cdk.out")
    }

    fn template(&self, stack: &str) -> Result<Value> {
        let path = self.out_dir().join(format!("{stack}.template.json"));
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("{} not synthesized", path.display()))?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[test]
fn test_synth_writes_templates_and_manifest() -> Result<()> {
    let env = FinopsTestEnv::new()?;

    env.finops()
        .arg("synth")
        .assert()
        .success()
        .stdout(predicate::str::contains("SUCCESS"));

    let mut files: Vec<String> = walkdir::WalkDir::new(env.out_dir())
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    assert_eq!(
        files,
        vec![
            "AtlasStudioFinOps-CUR.template.json",
            "AtlasStudioFinOps-Grafana.template.json",
            "manifest.json",
        ]
    );

    let manifest: Value =
        serde_json::from_str(&std::fs::read_to_string(env.out_dir().join("manifest.json"))?)?;
    assert_eq!(
        manifest["artifacts"][BILLING_STACK]["environment"],
        "aws://123456789012/us-east-1"
    );
    assert_eq!(
        manifest["artifacts"][DASHBOARD_STACK]["environment"],
        "aws://123456789012/eu-west-1"
    );
    Ok(())
}

#[test]
fn test_default_billing_scenario() -> Result<()> {
    let env = FinopsTestEnv::new()?;
    env.finops().arg("synth").assert().success();

    let template = env.template(BILLING_STACK)?;
    let resources = &template["Resources"];

    assert_eq!(
        resources["CurBucket"]["Properties"]["BucketName"],
        "finops-cur-123456789012-us-east-1"
    );
    assert_eq!(
        resources["CurCrawler"]["Properties"]["Schedule"]["ScheduleExpression"],
        "cron(0 6 * * ? *)"
    );
    let report = &resources["CurDefinition"]["Properties"];
    assert_eq!(report["ReportName"], "finops-daily");
    assert_eq!(report["S3Region"], "us-east-1");

    // Every statement naming the export principal is pinned to this account and report.
    let statements = resources["CurBucketPolicy"]["Properties"]["PolicyDocument"]["Statement"]
        .as_array()
        .cloned()
        .unwrap_or_default();
    let export: Vec<&Value> = statements
        .iter()
        .filter(|s| s["Principal"]["Service"] == "billingreports.amazonaws.com")
        .collect();
    assert!(!export.is_empty());
    for statement in export {
        assert_eq!(
            statement["Condition"]["StringEquals"]["aws:SourceAccount"],
            "123456789012"
        );
        assert!(
            statement["Condition"]["StringEquals"]["aws:SourceArn"]
                .as_str()
                .is_some_and(|arn| arn.starts_with("arn:aws:cur:us-east-1:123456789012:"))
        );
    }
    Ok(())
}

#[test]
fn test_dashboard_ingress_and_credentials() -> Result<()> {
    let env = FinopsTestEnv::new()?;
    env.finops().arg("synth").assert().success();

    let template = env.template(DASHBOARD_STACK)?;
    let resources = &template["Resources"];

    let ingress = resources["GrafanaLBSecurityGroup"]["Properties"]["SecurityGroupIngress"]
        .as_array()
        .cloned()
        .unwrap_or_default();
    assert_eq!(ingress.len(), 1);
    assert_eq!(ingress[0]["CidrIp"], "10.0.0.0/8");
    assert_eq!(ingress[0]["FromPort"], 80);
    assert_eq!(ingress[0]["ToPort"], 80);

    let container = &resources["GrafanaTaskDef"]["Properties"]["ContainerDefinitions"][0];
    let env_names: Vec<&str> = container["Environment"]
        .as_array()
        .map(|vars| vars.iter().filter_map(|v| v["Name"].as_str()).collect())
        .unwrap_or_default();
    assert!(!env_names.iter().any(|n| n.contains("ADMIN")));

    let secret_names: Vec<&str> = container["Secrets"]
        .as_array()
        .map(|vars| vars.iter().filter_map(|v| v["Name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(
        secret_names,
        vec!["GF_SECURITY_ADMIN_USER", "GF_SECURITY_ADMIN_PASSWORD"]
    );

    assert_eq!(resources["GrafanaAdminSecret"]["DeletionPolicy"], "Delete");
    assert_eq!(template["Outputs"]["GrafanaAdminSecretName"]["Value"], "grafana/admin");
    Ok(())
}

#[test]
fn test_prod_open_ingress_fails_before_writing() -> Result<()> {
    let env = FinopsTestEnv::new()?;

    env.finops()
        .arg("synth")
        .env("FINOPS_POSTURE", "prod")
        .env("FINOPS_ALLOWED_CIDR", "0.0.0.0/0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("finops::domain::open_ingress"));

    assert!(!env.out_dir().exists());
    Ok(())
}

#[test]
fn test_both_networks_fail() -> Result<()> {
    let env = FinopsTestEnv::new()?;
    env.edit_config(|yaml| {
        yaml.replace(
            "  network:\n",
            "  network:\n    existing:\n      vpc_id: vpc-0abc1234\n      public_subnet_ids: [subnet-0aaa1111, subnet-0bbb2222]\n      private_subnet_ids: [subnet-0ccc3333]\n",
        )
    })?;

    env.finops()
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("finops::domain::network"))
        .stderr(predicate::str::contains("`dashboard.network.existing`"));
    Ok(())
}

#[test]
fn test_crawl_target_outside_prefix_fails() -> Result<()> {
    let env = FinopsTestEnv::new()?;
    env.edit_config(|yaml| {
        yaml.replace(
            "  report_name: finops-daily\n",
            "  report_name: finops-daily\n  extra_crawl_targets:\n    - s3://finops-cur-123456789012-us-east-1/other/\n",
        )
    })?;

    env.finops()
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside the export prefix"));
    Ok(())
}

#[test]
fn test_validate_reports_each_stack() -> Result<()> {
    let env = FinopsTestEnv::new()?;
    env.finops()
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains(BILLING_STACK))
        .stdout(predicate::str::contains(DASHBOARD_STACK))
        .stdout(predicate::str::contains("All invariants hold"))
        .stdout(predicate::str::contains("ingress is open").not());
    assert!(!env.out_dir().exists());
    Ok(())
}

#[test]
fn test_default_open_ingress_warns_operator() -> Result<()> {
    let env = FinopsTestEnv::new()?;
    env.edit_config(|yaml| yaml.replace("  allowed_cidr: 10.0.0.0/8\n", ""))?;

    env.finops()
        .arg("synth")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dashboard ingress is open to 0.0.0.0/0"))
        .stderr(predicate::str::contains("reachable from any address"));

    let template = env.template(DASHBOARD_STACK)?;
    assert_eq!(
        template["Resources"]["GrafanaLBSecurityGroup"]["Properties"]["SecurityGroupIngress"][0]["CidrIp"],
        "0.0.0.0/0"
    );
    Ok(())
}

#[test]
fn test_explicit_open_ingress_warns_on_validate() -> Result<()> {
    let env = FinopsTestEnv::new()?;
    env.finops()
        .arg("validate")
        .env("FINOPS_ALLOWED_CIDR", "0.0.0.0/0")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dashboard ingress is open to 0.0.0.0/0"))
        .stderr(predicate::str::contains("reachable from any address"));
    Ok(())
}

#[test]
fn test_ingress_with_host_bits_fails() -> Result<()> {
    let env = FinopsTestEnv::new()?;
    env.finops()
        .arg("synth")
        .env("FINOPS_ALLOWED_CIDR", "10.1.2.3/8")
        .assert()
        .failure()
        .stderr(predicate::str::contains("finops::domain::cidr"))
        .stderr(predicate::str::contains("10.0.0.0/8"));

    assert!(!env.out_dir().exists());
    Ok(())
}

#[test]
fn test_teardown_retains_bucket_and_destroys_secret() -> Result<()> {
    let env = FinopsTestEnv::new()?;

    env.finops()
        .args(["teardown", "--stack", BILLING_STACK])
        .assert()
        .success()
        .stdout(predicate::str::contains("CurBucket"))
        .stdout(predicate::str::contains("RETAIN"));

    env.finops()
        .args(["teardown", "--stack", DASHBOARD_STACK])
        .assert()
        .success()
        .stdout(predicate::str::contains("GrafanaAdminSecret"))
        .stdout(predicate::str::contains("RETAIN").not());
    Ok(())
}

#[test]
fn test_graph_json() -> Result<()> {
    let env = FinopsTestEnv::new()?;

    let output = env
        .finops()
        .args(["graph", "--stack", BILLING_STACK, "--format", "json"])
        .output()?;
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout)?;
    let first_layer: Vec<&str> = report["layers"][0]
        .as_array()
        .map(|ids| ids.iter().filter_map(|id| id.as_str()).collect())
        .unwrap_or_default();
    assert!(first_layer.contains(&"CurBucket"));
    assert!(!first_layer.contains(&"CurDefinition"));
    Ok(())
}

#[test]
fn test_unknown_stack_fails() -> Result<()> {
    let env = FinopsTestEnv::new()?;
    env.finops()
        .args(["graph", "--stack", "Nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Stack 'Nope' not found"));
    Ok(())
}

#[test]
fn test_outputs_table() -> Result<()> {
    let env = FinopsTestEnv::new()?;
    env.finops()
        .arg("outputs")
        .assert()
        .success()
        .stdout(predicate::str::contains("CurBucketName"))
        .stdout(predicate::str::contains("RedshiftSpectrumRoleArn"))
        .stdout(predicate::str::contains("GrafanaURL"))
        .stdout(predicate::str::contains("grafana/admin"));
    Ok(())
}

#[test]
fn test_yaml_single_stack_to_custom_dir() -> Result<()> {
    let env = FinopsTestEnv::new()?;
    env.finops()
        .args(["synth", "--stack", DASHBOARD_STACK, "--format", "yaml", "--out", "yaml.out"])
        .assert()
        .success();

    let out = env.root.join("yaml.out");
    let content = std::fs::read_to_string(out.join("AtlasStudioFinOps-Grafana.template.yaml"))?;
    assert!(content.contains("AWSTemplateFormatVersion"));
    assert!(!out.join("AtlasStudioFinOps-CUR.template.yaml").exists());
    Ok(())
}

#[test]
fn test_clean_removes_assembly() -> Result<()> {
    let env = FinopsTestEnv::new()?;
    env.finops().arg("synth").assert().success();
    assert!(env.out_dir().exists());

    env.finops().arg("clean").assert().success();
    assert!(!env.out_dir().exists());
    assert!(env.root.join("finops.yaml").exists());
    Ok(())
}

#[test]
fn test_billing_removal_policies_snapshot() -> Result<()> {
    let env = FinopsTestEnv::new()?;
    env.finops().arg("synth").assert().success();

    let template = env.template(BILLING_STACK)?;
    let resources = template["Resources"]
        .as_object()
        .context("Resources missing")?;

    let sorted: BTreeMap<&String, &Value> = resources.iter().collect();
    let content = sorted
        .into_iter()
        .map(|(id, r)| {
            format!(
                "{} {} {}",
                id,
                r["Type"].as_str().unwrap_or("?"),
                r["DeletionPolicy"].as_str().unwrap_or("?")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    insta::assert_snapshot!("billing_removal_policies", content);
    Ok(())
}
