use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_3000")]
    pub port: u16,
    /// The service runs cluster-internal behind a Service, so it binds all
    /// interfaces by default.
    #[serde(default = "d_host")]
    pub host: String,
    #[serde(default)]
    pub cors: CorsConfig,
    /// Cap on requests served concurrently; excess requests queue.
    #[serde(default = "d_256")]
    pub max_concurrent_requests: usize,
    /// Maximum accepted JSON body size in bytes.
    #[serde(default = "d_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".into(),
            cors: CorsConfig::default(),
            max_concurrent_requests: 256,
            body_limit_bytes: d_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed for CORS. Defaults to `["*"]` because the API is only
    /// reachable inside the cluster; restrict it when exposing the service.
    #[serde(default = "d_cors_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: d_cors_origins(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_3000() -> u16 {
    3000
}
fn d_host() -> String {
    "0.0.0.0".into()
}
fn d_256() -> usize {
    256
}
fn d_body_limit() -> usize {
    10 * 1024 * 1024
}
fn d_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_empty_toml_uses_all_defaults() {
        let cfg: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.max_concurrent_requests, 256);
        assert_eq!(cfg.body_limit_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn server_config_parses_overrides() {
        let toml_str = r#"
            port = 8080
            host = "127.0.0.1"
            max_concurrent_requests = 32
        "#;
        let cfg: ServerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.max_concurrent_requests, 32);
    }

    #[test]
    fn cors_defaults_to_wildcard() {
        let cfg = CorsConfig::default();
        assert_eq!(cfg.allowed_origins, vec!["*".to_string()]);
    }

    #[test]
    fn cors_parses_custom_origins() {
        let toml_str = r#"
            [cors]
            allowed_origins = ["https://billing.internal", "http://localhost:3000"]
        "#;
        let cfg: ServerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.cors.allowed_origins.len(), 2);
    }
}
