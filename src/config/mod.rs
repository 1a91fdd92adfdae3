/// Configuration management for gke-deploy
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A project and the resources declared in it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// GCP project ID used when authenticating against clusters
    #[serde(default)]
    pub project_id: String,

    /// Declared resources, clusters and workloads intermixed, in order
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub resources: Vec<Resource>,
}

/// One declared resource, written as a single-key map (`- gke_cluster: ...`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    GkeCluster(GkeCluster),
    GkeWorkload(GkeWorkload),
}

/// GKE cluster resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GkeCluster {
    pub properties: GkeClusterProperties,
}

/// Properties of a GKE cluster resource
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GkeClusterProperties {
    /// Resource name, referenced by workloads
    #[serde(rename = "name")]
    pub resource_name: String,

    /// Whether the cluster is addressed by region or by zone
    #[serde(rename = "clusterLocationType", default)]
    pub location_type: LocationType,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub region: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub zone: String,

    /// Cluster spec handed to the infrastructure template, not read here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<serde_yaml::Value>,
}

/// Cluster location discriminator
///
/// Unknown values are kept as written so that resolution can report them
/// against the owning cluster instead of failing the whole load.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LocationType {
    Regional,
    Zonal,
    #[default]
    Unset,
    Other(String),
}

impl From<String> for LocationType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Regional" => LocationType::Regional,
            "Zonal" => LocationType::Zonal,
            "" => LocationType::Unset,
            _ => LocationType::Other(value),
        }
    }
}

impl From<LocationType> for String {
    fn from(value: LocationType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationType::Regional => write!(f, "Regional"),
            LocationType::Zonal => write!(f, "Zonal"),
            LocationType::Unset => Ok(()),
            LocationType::Other(value) => write!(f, "{}", value),
        }
    }
}

/// Kubernetes workload targeting a declared GKE cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GkeWorkload {
    /// Resource name of the target cluster
    pub cluster_name: String,

    /// Manifest applied verbatim with kubectl
    #[serde(default)]
    pub properties: serde_yaml::Value,
}

impl GkeWorkload {
    /// `kind/name` of the manifest when both are present
    pub fn manifest_ref(&self) -> Option<String> {
        let kind = self.properties.get("kind")?.as_str()?;
        let name = self.properties.get("metadata")?.get("name")?.as_str()?;
        Some(format!("{}/{}", kind, name))
    }
}

impl FromStr for ProjectConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> anyhow::Result<Self> {
        Self::parse(content, None)
    }
}

impl ProjectConfig {
    /// Load configuration from a YAML file
    ///
    /// `project_override` replaces the file's `project_id` before validation.
    pub fn from_file<P: AsRef<Path>>(
        path: P,
        project_override: Option<&str>,
    ) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, project_override)
    }

    /// Parse YAML text, apply the project override, then validate
    pub fn parse(content: &str, project_override: Option<&str>) -> anyhow::Result<Self> {
        let mut config: ProjectConfig = serde_yaml::from_str(content)?;
        if let Some(project) = project_override {
            config.project_id = project.to_string();
        }
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.project_id.is_empty() {
            anyhow::bail!("project_id cannot be empty");
        }
        Ok(())
    }

    /// Declared clusters, in configuration order
    pub fn clusters(&self) -> impl Iterator<Item = &GkeCluster> {
        self.resources.iter().filter_map(|r| match r {
            Resource::GkeCluster(cluster) => Some(cluster),
            _ => None,
        })
    }

    /// Declared workloads, in configuration order
    pub fn workloads(&self) -> impl Iterator<Item = &GkeWorkload> {
        self.resources.iter().filter_map(|r| match r {
            Resource::GkeWorkload(workload) => Some(workload),
            _ => None,
        })
    }

    /// Generate an example configuration file
    pub fn example() -> Self {
        let manifest = serde_yaml::from_str(
            "apiVersion: apps/v1\n\
             kind: Deployment\n\
             metadata:\n  name: hello\n\
             spec:\n  replicas: 1\n",
        )
        .unwrap_or(serde_yaml::Value::Null);

        Self {
            project_id: "my-project".to_string(),
            resources: vec![
                Resource::GkeCluster(GkeCluster {
                    properties: GkeClusterProperties {
                        resource_name: "cluster1".to_string(),
                        location_type: LocationType::Regional,
                        region: "us-central1".to_string(),
                        zone: String::new(),
                        cluster: None,
                    },
                }),
                Resource::GkeWorkload(GkeWorkload {
                    cluster_name: "cluster1".to_string(),
                    properties: manifest,
                }),
            ],
        }
    }
}
