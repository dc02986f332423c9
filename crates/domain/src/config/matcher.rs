use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Usage-term matcher endpoint
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// gRPC endpoint of the usage-term matcher. The gateway bakes these into
/// generated documents as `USAGE_TERM_MATCHER_HOST` / `_PORT`; the trigger
/// client falls back to the same defaults when the variables are absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    #[serde(default = "d_matcher_host")]
    pub host: String,
    #[serde(default = "d_50051")]
    pub port: u16,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            host: d_matcher_host(),
            port: 50051,
        }
    }
}

impl MatcherConfig {
    /// `host:port` as grpcurl expects it.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn d_matcher_host() -> String {
    "usage-term-matcher-ps-grpc.billing-agreement-service-layer.svc.cluster.local".into()
}
fn d_50051() -> u16 {
    50051
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matcher_config_default_address() {
        let cfg = MatcherConfig::default();
        assert_eq!(
            cfg.address(),
            "usage-term-matcher-ps-grpc.billing-agreement-service-layer.svc.cluster.local:50051"
        );
    }

    #[test]
    fn matcher_config_parses_overrides() {
        let cfg: MatcherConfig = toml::from_str(
            r#"
            host = "localhost"
            port = 9090
        "#,
        )
        .unwrap();
        assert_eq!(cfg.address(), "localhost:9090");
    }
}
