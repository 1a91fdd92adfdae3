/// Location flag resolution for `gcloud container clusters get-credentials`
use crate::config::{GkeCluster, LocationType};
use crate::error::DeployError;

/// CLI flag and value addressing a cluster's location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterLocation {
    pub flag: &'static str,
    pub value: String,
}

/// Derive `--region <region>` or `--zone <zone>` from the cluster's location type
pub fn resolve_location(cluster: &GkeCluster) -> Result<ClusterLocation, DeployError> {
    let props = &cluster.properties;
    let cluster_name = || props.resource_name.clone();

    match props.location_type {
        LocationType::Regional => {
            if props.region.is_empty() {
                return Err(DeployError::MissingRegion {
                    cluster_name: cluster_name(),
                });
            }
            Ok(ClusterLocation {
                flag: "--region",
                value: props.region.clone(),
            })
        }
        LocationType::Zonal => {
            if props.zone.is_empty() {
                return Err(DeployError::MissingZone {
                    cluster_name: cluster_name(),
                });
            }
            Ok(ClusterLocation {
                flag: "--zone",
                value: props.zone.clone(),
            })
        }
        LocationType::Unset | LocationType::Other(_) => Err(DeployError::InvalidLocationType {
            cluster_name: cluster_name(),
        }),
    }
}
