/// Deployment of GKE workloads onto their declared clusters
use tracing::{debug, info};

use crate::config::{GkeWorkload, ProjectConfig};
use crate::error::DeployError;
use crate::gke::commands::{apply_command, cluster_id, credentials_command};
use crate::gke::index::ClusterIndex;
use crate::gke::location::{resolve_location, ClusterLocation};
use crate::gke::manifest::ManifestWriter;
use crate::utils::command::CommandExecutor;

/// A workload together with the cluster it will be applied to
#[derive(Debug, Clone)]
pub struct WorkloadTarget<'a> {
    pub label: String,
    pub workload: &'a GkeWorkload,
    pub cluster_id: String,
    pub location: ClusterLocation,
}

/// Outcome of a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploySummary {
    pub workloads_applied: usize,
    /// Cluster IDs in the order they were authenticated against
    pub clusters: Vec<String>,
}

/// Human readable identifier of the n-th workload
fn workload_label(position: usize, workload: &GkeWorkload) -> String {
    match workload.manifest_ref() {
        Some(manifest) => format!(
            "workload #{} ({} on {})",
            position + 1,
            manifest,
            workload.cluster_name
        ),
        None => format!("workload #{} ({})", position + 1, workload.cluster_name),
    }
}

fn resolve_target<'a>(
    index: &ClusterIndex<'a>,
    position: usize,
    workload: &'a GkeWorkload,
) -> Result<WorkloadTarget<'a>, DeployError> {
    let cluster = index.resolve(&workload.cluster_name)?;
    let location = resolve_location(cluster)?;
    Ok(WorkloadTarget {
        label: workload_label(position, workload),
        workload,
        cluster_id: cluster_id(&cluster.properties.resource_name),
        location,
    })
}

/// Resolve the target cluster and location of every workload, in configuration order
///
/// Stops at the first workload that cannot be resolved.
pub fn resolve_targets(config: &ProjectConfig) -> Result<Vec<WorkloadTarget<'_>>, DeployError> {
    let index = ClusterIndex::build(config);
    debug!("Indexed {} cluster(s)", index.len());

    config
        .workloads()
        .enumerate()
        .map(|(position, workload)| resolve_target(&index, position, workload))
        .collect()
}

/// Authenticates against each workload's cluster and applies its manifest
pub struct WorkloadDeployer<E> {
    executor: E,
    manifests: ManifestWriter,
}

impl<E: CommandExecutor> WorkloadDeployer<E> {
    /// Create a deployer that writes manifests to the system temp dir
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            manifests: ManifestWriter::new(),
        }
    }

    pub fn with_manifest_writer(mut self, manifests: ManifestWriter) -> Self {
        self.manifests = manifests;
        self
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Deploy every workload of the project, one at a time and in order
    ///
    /// The first failure ends the run; workloads after it are not attempted.
    pub async fn deploy_workloads(
        &self,
        config: &ProjectConfig,
    ) -> Result<DeploySummary, DeployError> {
        let index = ClusterIndex::build(config);
        debug!("Indexed {} cluster(s)", index.len());
        let mut summary = DeploySummary::default();

        for (position, workload) in config.workloads().enumerate() {
            let target = resolve_target(&index, position, workload)?;
            self.deploy_workload(&target, &config.project_id).await?;

            summary.workloads_applied += 1;
            summary.clusters.push(target.cluster_id);
        }

        Ok(summary)
    }

    async fn deploy_workload(
        &self,
        target: &WorkloadTarget<'_>,
        project_id: &str,
    ) -> Result<(), DeployError> {
        info!(
            "Deploying {} to cluster {} ({} {})",
            target.label, target.cluster_id, target.location.flag, target.location.value
        );

        let credentials = credentials_command(
            &target.cluster_id,
            target.location.flag,
            &target.location.value,
            project_id,
        );
        self.executor.execute(&credentials).await?;

        // Dropping the handle removes the file, whether or not apply succeeded
        let manifest = self.manifests.write(target.workload, &target.label)?;
        self.executor
            .execute(&apply_command(manifest.path()))
            .await?;

        info!("✓ Applied {}", target.label);
        Ok(())
    }
}
