/// gke-deploy - Kubernetes workloads onto declared GKE clusters
///
/// Reads a project configuration that declares GKE clusters alongside the
/// workloads meant to run on them, fetches credentials for each workload's
/// cluster with gcloud and applies its manifest with kubectl.
mod config;
mod error;
mod gke;
mod utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ProjectConfig;
use crate::gke::manifest::ManifestWriter;
use crate::gke::workload::resolve_targets;
use crate::gke::WorkloadDeployer;
use crate::utils::command::{check_tool_installed, ProcessExecutor, RecordingExecutor};

#[derive(Parser)]
#[command(name = "gke-deploy")]
#[command(about = "Deploy Kubernetes workloads onto declared GKE clusters", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "deploy.yaml")]
    config: PathBuf,

    /// Override the project ID from the configuration
    #[arg(long)]
    project: Option<String>,

    /// Directory for temporary manifest files (defaults to the system temp dir)
    #[arg(long)]
    manifest_dir: Option<PathBuf>,

    /// Kubeconfig file used by gcloud and kubectl instead of the default one
    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate against each workload's cluster and apply its manifest
    Deploy,

    /// Print the commands a deploy would run, without running them
    Plan {
        /// Print the command list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that every workload targets a declared, well-located cluster
    Validate,

    /// Generate example configuration file
    Init,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("gke_deploy={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let result = match cli.command {
        Commands::Deploy => deploy(&cli).await,
        Commands::Plan { json } => plan(&cli, json).await,
        Commands::Validate => validate(&cli),
        Commands::Init => init_config(&cli).await,
    };

    if let Err(e) = result {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Load the configuration, applying command line overrides
fn load_config(cli: &Cli) -> Result<ProjectConfig> {
    let config = ProjectConfig::from_file(&cli.config, cli.project.as_deref())
        .context("Failed to load configuration")?;

    info!("Project: {}", config.project_id);
    Ok(config)
}

fn manifest_writer(cli: &Cli) -> ManifestWriter {
    match &cli.manifest_dir {
        Some(dir) => ManifestWriter::in_dir(dir.clone()),
        None => ManifestWriter::new(),
    }
}

/// Deploy all workloads
async fn deploy(cli: &Cli) -> Result<()> {
    info!("Starting workload deployment...");

    check_tool_installed(
        "gcloud",
        &["version"],
        "https://cloud.google.com/sdk/docs/install",
    )
    .await
    .context("gcloud is required")?;
    check_tool_installed(
        "kubectl",
        &["version", "--client"],
        "https://kubernetes.io/docs/tasks/tools/",
    )
    .await
    .context("kubectl is required")?;

    let config = load_config(cli)?;

    let mut executor = ProcessExecutor::new();
    if let Some(path) = &cli.kubeconfig {
        executor = executor.with_kubeconfig(path.clone());
    }

    let deployer = WorkloadDeployer::new(executor).with_manifest_writer(manifest_writer(cli));
    let summary = deployer.deploy_workloads(&config).await?;

    info!("✓ Deployment completed successfully!");
    info!("  Workloads applied: {}", summary.workloads_applied);
    for cluster in &summary.clusters {
        info!("  - {}", cluster);
    }

    Ok(())
}

/// Show the gcloud/kubectl commands a deploy would run
async fn plan(cli: &Cli, json: bool) -> Result<()> {
    let config = load_config(cli)?;

    let deployer =
        WorkloadDeployer::new(RecordingExecutor::new()).with_manifest_writer(manifest_writer(cli));
    deployer.deploy_workloads(&config).await?;

    let commands = deployer.executor().commands();
    if json {
        println!("{}", serde_json::to_string_pretty(&commands)?);
    } else {
        for command in &commands {
            println!("{}", command);
        }
    }

    Ok(())
}

/// Validate workload targets without touching any cluster
fn validate(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let targets = resolve_targets(&config)?;

    for target in &targets {
        info!(
            "  {} -> {} ({} {})",
            target.label, target.cluster_id, target.location.flag, target.location.value
        );
    }
    info!("✓ {} workload(s) resolved", targets.len());

    Ok(())
}

/// Initialize example configuration file
async fn init_config(cli: &Cli) -> Result<()> {
    if cli.config.exists() {
        anyhow::bail!(
            "Configuration file already exists: {}",
            cli.config.display()
        );
    }

    let example_config = ProjectConfig::example();
    let yaml = serde_yaml::to_string(&example_config)?;

    tokio::fs::write(&cli.config, yaml)
        .await
        .context("Failed to write configuration file")?;

    info!("Example configuration created: {}", cli.config.display());
    info!("");
    info!("Next steps:");
    info!("  1. Edit the project ID, clusters and workloads");
    info!("  2. Log in with gcloud:");
    info!("     gcloud auth login");
    info!("  3. Deploy the workloads:");
    info!("     gke-deploy deploy");

    Ok(())
}
