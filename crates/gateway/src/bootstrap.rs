//! AppState construction extracted from `main.rs`.

use std::sync::Arc;

use cadence_domain::config::{Config, ConfigSeverity};

use crate::runtime::dags::DagService;
use crate::state::AppState;

/// Validate config and return a fully-wired [`AppState`].
///
/// Config errors abort startup; warnings (unknown default timezone,
/// short default schedule, wildcard CORS) are logged and tolerated.
pub async fn build_app_state(config: Arc<Config>, config_path: &str) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    let error_count = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    if error_count > 0 {
        anyhow::bail!("config validation failed with {error_count} error(s) in {config_path}");
    }

    // ── DAG service ──────────────────────────────────────────────────
    let dags = Arc::new(DagService::new(config.clone()));
    tracing::info!(
        dag_dir = %config.store.dag_dir.display(),
        matcher = %config.matcher.address(),
        "DAG service ready"
    );

    Ok(AppState { config, dags })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_config_boots() {
        let state = build_app_state(Arc::new(Config::default()), "config.toml")
            .await
            .expect("default config must boot");
        assert_eq!(state.config.server.port, 3000);
    }

    #[tokio::test]
    async fn invalid_config_aborts_startup() {
        let mut config = Config::default();
        config.server.port = 0;
        let err = build_app_state(Arc::new(config), "config.toml")
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("config validation failed"), "got: {err}");
    }
}
