mod matcher;
mod scheduling;
mod server;
mod store;

pub use matcher::*;
pub use scheduling::*;
pub use server::*;
pub use store::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub matcher: MatcherConfig,
    #[serde(default)]
    pub scheduling: SchedulingConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        // Server port must be non-zero.
        if self.server.port == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.port".into(),
                message: "port must be greater than 0".into(),
            });
        }

        // Server host must not be empty.
        if self.server.host.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.host".into(),
                message: "host must not be empty".into(),
            });
        }

        // The DAG directory is where every document lands.
        if self.store.dag_dir.as_os_str().is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "store.dag_dir".into(),
                message: "dag_dir must not be empty".into(),
            });
        }

        // Matcher endpoint is baked into every generated document.
        if self.matcher.host.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "matcher.host".into(),
                message: "host must not be empty".into(),
            });
        }
        if self.matcher.port == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "matcher.port".into(),
                message: "port must be greater than 0".into(),
            });
        }

        // An unknown default timezone is recovered to UTC at runtime, so it
        // only warrants a warning here.
        if self
            .scheduling
            .default_timezone
            .parse::<chrono_tz::Tz>()
            .is_err()
        {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "scheduling.default_timezone".into(),
                message: format!(
                    "unknown timezone '{}' (will fall back to UTC)",
                    self.scheduling.default_timezone
                ),
            });
        }

        // The default schedule must at least look like a cron expression.
        if self.scheduling.default_schedule.split_whitespace().count() < 5 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "scheduling.default_schedule".into(),
                message: format!(
                    "'{}' has fewer than 5 cron fields",
                    self.scheduling.default_schedule
                ),
            });
        }

        // CORS: warn if wildcard is used.
        if self.server.cors.allowed_origins.len() == 1
            && self.server.cors.allowed_origins[0] == "*"
        {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "server.cors.allowed_origins".into(),
                message: "wildcard \"*\" allows all origins (not recommended for production)".into(),
            });
        }

        errors
    }
}
