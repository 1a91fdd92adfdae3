/// Temporary manifest files handed to `kubectl apply -f`
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

use crate::config::GkeWorkload;
use crate::error::DeployError;

/// Writes workload manifests to temporary YAML files
#[derive(Debug, Clone, Default)]
pub struct ManifestWriter {
    dir: Option<PathBuf>,
}

impl ManifestWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create manifest files inside `dir` instead of the system temp dir
    pub fn in_dir(dir: PathBuf) -> Self {
        Self { dir: Some(dir) }
    }

    /// Serialize the workload's manifest; the file is removed when the handle drops
    pub fn write(&self, workload: &GkeWorkload, label: &str) -> Result<NamedTempFile, DeployError> {
        let write_err = |source: std::io::Error| DeployError::ManifestWrite {
            workload: label.to_string(),
            source,
        };

        let mut builder = tempfile::Builder::new();
        builder.prefix("gke-workload-").suffix(".yaml");
        let mut file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(write_err)?;

        let yaml = serde_yaml::to_string(&workload.properties)
            .map_err(|e| write_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
        file.write_all(yaml.as_bytes()).map_err(write_err)?;
        file.flush().map_err(write_err)?;

        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workload() -> GkeWorkload {
        GkeWorkload {
            cluster_name: "cluster1".to_string(),
            properties: serde_yaml::from_str("apiVersion: v1\nkind: Service\n").unwrap(),
        }
    }

    #[test]
    fn test_manifest_written_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ManifestWriter::in_dir(dir.path().to_path_buf());

        let file = writer.write(&workload(), "workload #1").unwrap();
        let path = file.path().to_path_buf();
        assert!(path.starts_with(dir.path()));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("yaml"));

        let written: serde_yaml::Value =
            serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, workload().properties);

        drop(file);
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_dir_is_write_failure() {
        let writer = ManifestWriter::in_dir(PathBuf::from("/nonexistent/gke-deploy/manifests"));
        let err = writer.write(&workload(), "workload #3 (cluster1)").unwrap_err();
        assert!(matches!(
            err,
            DeployError::ManifestWrite { ref workload, .. } if workload == "workload #3 (cluster1)"
        ));
    }
}
