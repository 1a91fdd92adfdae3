/// Lookup of declared clusters by resource name
use std::collections::HashMap;

use crate::config::{GkeCluster, ProjectConfig};
use crate::error::DeployError;

/// Clusters of one project, keyed by resource name
pub struct ClusterIndex<'a> {
    clusters: HashMap<&'a str, &'a GkeCluster>,
}

impl<'a> ClusterIndex<'a> {
    /// Index every cluster in the project; the first declaration of a name wins
    pub fn build(config: &'a ProjectConfig) -> Self {
        let mut clusters = HashMap::new();
        for cluster in config.clusters() {
            clusters
                .entry(cluster.properties.resource_name.as_str())
                .or_insert(cluster);
        }
        Self { clusters }
    }

    /// Find the cluster a workload targets
    pub fn resolve(&self, cluster_name: &str) -> Result<&'a GkeCluster, DeployError> {
        self.clusters
            .get(cluster_name)
            .copied()
            .ok_or_else(|| DeployError::ClusterNotFound {
                cluster_name: cluster_name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_keeps_first_declaration() {
        let config: ProjectConfig = r#"
project_id: p
resources:
- gke_cluster:
    properties: {name: a, clusterLocationType: Regional, region: first}
- gke_workload:
    cluster_name: a
    properties: {}
- gke_cluster:
    properties: {name: a, clusterLocationType: Regional, region: second}
- gke_cluster:
    properties: {name: b, clusterLocationType: Zonal, zone: z}
"#
        .parse()
        .unwrap();

        let index = ClusterIndex::build(&config);
        assert_eq!(index.len(), 2);
        assert_eq!(index.resolve("a").unwrap().properties.region, "first");
        assert_eq!(index.resolve("b").unwrap().properties.zone, "z");
    }

    #[test]
    fn test_unknown_cluster() {
        let config = ProjectConfig::example();
        let index = ClusterIndex::build(&config);

        let err = index.resolve("clusterX").unwrap_err();
        assert!(matches!(
            err,
            DeployError::ClusterNotFound { ref cluster_name } if cluster_name == "clusterX"
        ));
    }
}
