/// Error types for workload deployment
use thiserror::Error;

/// Failures that stop a deployment run
#[derive(Debug, Error)]
pub enum DeployError {
    /// A workload references a cluster that is not declared in the config
    #[error("failed to find cluster: {cluster_name:?}")]
    ClusterNotFound { cluster_name: String },

    /// The cluster's location type is neither Regional nor Zonal
    #[error("failed to get cluster's location: {cluster_name}")]
    InvalidLocationType { cluster_name: String },

    #[error("failed to get cluster's region: {cluster_name}")]
    MissingRegion { cluster_name: String },

    #[error("failed to get cluster's zone: {cluster_name}")]
    MissingZone { cluster_name: String },

    /// External command could not be spawned or exited non-zero
    #[error("command `{command}` failed: {cause}")]
    CommandExecution { command: String, cause: String },

    /// Workload manifest could not be written to a temporary file
    #[error("failed to write manifest for {workload}")]
    ManifestWrite {
        workload: String,
        #[source]
        source: std::io::Error,
    },
}
