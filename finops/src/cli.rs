// finops/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand};
use finops_core::infrastructure::renderer::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "finops")]
#[command(about = "Synthesizes the billing export and cost dashboard stacks", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🏗️  Synthesizes stack templates and the assembly manifest
    Synth {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Synthesize only this stack (ex: "AtlasStudioFinOps-CUR")
        #[arg(long, short)]
        stack: Option<String>,

        /// Template syntax: json | yaml
        #[arg(long, default_value = "json")]
        format: OutputFormat,

        /// Output directory (defaults to the project's out-dir)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// 🛡️  Checks every security invariant without writing anything
    Validate {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// 🔗 Shows the resource dependency graph of one stack
    Graph {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        #[arg(long, short)]
        stack: String,

        /// Output format: mermaid | json
        #[arg(long, default_value = "mermaid")]
        format: String,
    },

    /// 🧨 Lists what deleting a stack destroys and what it leaves behind
    Teardown {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        #[arg(long, short)]
        stack: String,
    },

    /// 📤 Lists the outputs every stack exposes
    Outputs {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// 🧹 Removes the synthesized assembly (out-dir)
    Clean {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_synth_defaults() -> Result<()> {
        let args = Cli::parse_from(["finops", "synth"]);
        match args.command {
            Commands::Synth {
                project_dir,
                stack,
                format,
                out,
            } => {
                assert_eq!(project_dir.to_string_lossy(), ".");
                assert_eq!(stack, None);
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(out, None);
                Ok(())
            }
            _ => bail!("Expected Synth command"),
        }
    }

    #[test]
    fn test_cli_parse_synth_yaml_single_stack() -> Result<()> {
        let args = Cli::parse_from([
            "finops",
            "synth",
            "--stack",
            "AtlasStudioFinOps-CUR",
            "--format",
            "yaml",
            "--project-dir",
            "/tmp",
        ]);
        match args.command {
            Commands::Synth {
                project_dir,
                stack,
                format,
                ..
            } => {
                assert_eq!(project_dir.to_string_lossy(), "/tmp");
                assert_eq!(stack.as_deref(), Some("AtlasStudioFinOps-CUR"));
                assert_eq!(format, OutputFormat::Yaml);
                Ok(())
            }
            _ => bail!("Expected Synth command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["finops", "synth", "--format", "toml"]).is_err());
    }

    #[test]
    fn test_cli_graph_requires_stack() -> Result<()> {
        assert!(Cli::try_parse_from(["finops", "graph"]).is_err());

        let args = Cli::parse_from(["finops", "graph", "-s", "AtlasStudioFinOps-Grafana"]);
        match args.command {
            Commands::Graph { stack, format, .. } => {
                assert_eq!(stack, "AtlasStudioFinOps-Grafana");
                assert_eq!(format, "mermaid");
                Ok(())
            }
            _ => bail!("Expected Graph command"),
        }
    }
}
