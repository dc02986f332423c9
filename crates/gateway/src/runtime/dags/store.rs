//! DAG file store — one YAML file per DAG under the configured directory.
//!
//! Files are the source of truth; there is no cache. The create/update
//! distinction upstream is an existence check against this store.

use std::path::PathBuf;

use cadence_domain::{Error, Result};

#[derive(Debug)]
pub struct DagStore {
    dag_dir: PathBuf,
}

impl DagStore {
    pub fn new(dag_dir: impl Into<PathBuf>) -> Self {
        Self {
            dag_dir: dag_dir.into(),
        }
    }

    /// Path of the YAML file backing `dag_name`.
    pub fn file_path(&self, dag_name: &str) -> PathBuf {
        self.dag_dir.join(format!("{dag_name}.yaml"))
    }

    pub async fn exists(&self, dag_name: &str) -> bool {
        tokio::fs::try_exists(self.file_path(dag_name))
            .await
            .unwrap_or(false)
    }

    pub async fn read(&self, dag_name: &str) -> Result<String> {
        let path = self.file_path(dag_name);
        tokio::fs::read_to_string(&path).await.map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "failed to read DAG file");
            Error::Io(e)
        })
    }

    /// Write the document, creating the DAG directory on demand.
    pub async fn write(&self, dag_name: &str, content: &str) -> Result<()> {
        let path = self.file_path(dag_name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(Error::Io)?;
        }
        tokio::fs::write(&path, content).await.map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "failed to write DAG file");
            Error::Io(e)
        })?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "wrote DAG file");
        Ok(())
    }

    pub async fn remove(&self, dag_name: &str) -> Result<()> {
        let path = self.file_path(dag_name);
        tokio::fs::remove_file(&path).await.map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove DAG file");
            Error::Io(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_read_remove_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = DagStore::new(dir.path());

        assert!(!store.exists("c-1-sl").await);
        store.write("c-1-sl", "name: c-1-sl\n").await.unwrap();
        assert!(store.exists("c-1-sl").await);
        assert_eq!(store.read("c-1-sl").await.unwrap(), "name: c-1-sl\n");

        store.remove("c-1-sl").await.unwrap();
        assert!(!store.exists("c-1-sl").await);
    }

    #[tokio::test]
    async fn write_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("dags").join("live");
        let store = DagStore::new(&nested);

        store.write("c-2-gi", "name: c-2-gi\n").await.unwrap();
        assert!(nested.join("c-2-gi.yaml").is_file());
    }

    #[tokio::test]
    async fn read_missing_file_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = DagStore::new(dir.path());

        let err = store.read("absent").await.unwrap_err();
        match err {
            Error::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn file_path_appends_yaml_extension() {
        let store = DagStore::new("/home/dagu/dags");
        assert_eq!(
            store.file_path("abc-pce"),
            PathBuf::from("/home/dagu/dags/abc-pce.yaml")
        );
    }
}
