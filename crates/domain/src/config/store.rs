use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Document store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory watched by the Dagu scheduler. One YAML document per
    /// `(contract, request type)` pair lands here.
    #[serde(default = "d_dag_dir")]
    pub dag_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dag_dir: d_dag_dir(),
        }
    }
}

fn d_dag_dir() -> PathBuf {
    PathBuf::from("/home/dagu/dags")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_config_defaults_to_dagu_home() {
        let cfg = StoreConfig::default();
        assert_eq!(cfg.dag_dir, PathBuf::from("/home/dagu/dags"));
    }

    #[test]
    fn store_config_parses_custom_dir() {
        let cfg: StoreConfig = toml::from_str(r#"dag_dir = "/tmp/dags""#).unwrap();
        assert_eq!(cfg.dag_dir, PathBuf::from("/tmp/dags"));
    }
}
