/// GKE workload deployment
pub mod commands;
pub mod index;
pub mod location;
pub mod manifest;
pub mod workload;

pub use workload::WorkloadDeployer;
