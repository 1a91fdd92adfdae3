/// Argument vectors for gcloud and kubectl
use std::path::Path;

use crate::utils::command::CommandSpec;

/// Suffix the cluster template appends to the declared resource name
pub const CLUSTER_ID_SUFFIX: &str = "-cluster";

/// Name gcloud knows the cluster by
pub fn cluster_id(resource_name: &str) -> String {
    format!("{}{}", resource_name, CLUSTER_ID_SUFFIX)
}

/// `gcloud container clusters get-credentials <id> <flag> <value> --project <project>`
pub fn credentials_command(
    cluster_id: &str,
    location_flag: &str,
    location_value: &str,
    project_id: &str,
) -> CommandSpec {
    CommandSpec::new([
        "gcloud",
        "container",
        "clusters",
        "get-credentials",
        cluster_id,
        location_flag,
        location_value,
        "--project",
        project_id,
    ])
}

/// `kubectl apply -f <manifest>`
pub fn apply_command(manifest_path: &Path) -> CommandSpec {
    CommandSpec::new([
        "kubectl".to_string(),
        "apply".to_string(),
        "-f".to_string(),
        manifest_path.to_string_lossy().into_owned(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_command() {
        let spec = credentials_command("bar-cluster", "--region", "foo-center", "foo-project");
        assert_eq!(
            spec.args(),
            [
                "gcloud",
                "container",
                "clusters",
                "get-credentials",
                "bar-cluster",
                "--region",
                "foo-center",
                "--project",
                "foo-project"
            ]
        );
    }

    #[test]
    fn test_apply_command() {
        let spec = apply_command(Path::new("foo/bar/abc.yaml"));
        assert_eq!(spec.args(), ["kubectl", "apply", "-f", "foo/bar/abc.yaml"]);
    }

    #[test]
    fn test_empty_inputs_pass_through() {
        let spec = credentials_command("", "--zone", "", "");
        assert_eq!(spec.args().len(), 9);
        assert_eq!(spec.args()[4], "");
    }

    #[test]
    fn test_cluster_id() {
        assert_eq!(cluster_id("cluster1"), "cluster1-cluster");
    }
}
