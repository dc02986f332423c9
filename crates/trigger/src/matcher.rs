//! grpcurl-backed client for `service.v1.TriggerMatcherService`.
//!
//! The workflow image ships `grpcurl`, so gRPC is spoken through that
//! binary instead of a generated client, which keeps this crate free of a
//! protobuf toolchain. Arguments are passed as an argv list; nothing goes
//! through a shell.

use anyhow::Context as _;
use cadence_domain::config::MatcherConfig;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio::process::Command;

pub const PROCESS_CONTRACT_EVENTS: &str =
    "service.v1.TriggerMatcherService/ProcessContractEvents";
pub const TRIGGER_EVENT: &str = "service.v1.TriggerMatcherService/TriggerEvent";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Endpoint
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where grpcurl dials. `USAGE_TERM_MATCHER_HOST` / `_PORT` override the
/// built-in service defaults; the port stays a string because it is only
/// ever pasted back into `host:port`.
#[derive(Debug, Clone)]
pub struct MatcherEndpoint {
    pub host: String,
    pub port: String,
}

impl MatcherEndpoint {
    pub fn from_env() -> Self {
        let defaults = MatcherConfig::default();
        Self {
            host: env_or("USAGE_TERM_MATCHER_HOST", defaults.host),
            port: env_or("USAGE_TERM_MATCHER_PORT", defaults.port.to_string()),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Invoke `method` with the security-context header and a JSON body,
    /// returning grpcurl's stdout. Nonzero exit is an error; stderr is
    /// logged either way because grpcurl uses it for TLS and reflection
    /// warnings even on success.
    pub async fn call<B: Serialize>(
        &self,
        method: &str,
        security: &SecurityContext,
        body: &B,
    ) -> anyhow::Result<String> {
        let header = serde_json::to_string(security)?;
        let payload = serde_json::to_string(body)?;
        let args = grpcurl_args(&self.address(), &header, &payload, method);

        tracing::info!(method, address = %self.address(), "calling usage term matcher");
        tracing::debug!(payload = %payload, "matcher request body");

        let output = Command::new("grpcurl")
            .args(&args)
            .output()
            .await
            .context("failed to run grpcurl")?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            tracing::warn!(stderr = %stderr.trim(), "grpcurl stderr");
        }
        if !output.status.success() {
            anyhow::bail!("grpcurl exited with {}: {}", output.status, stderr.trim());
        }
        Ok(stdout)
    }
}

fn env_or(name: &str, default: String) -> String {
    std::env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or(default)
}

fn grpcurl_args(address: &str, security_header: &str, payload: &str, method: &str) -> Vec<String> {
    vec![
        "-plaintext".into(),
        "-H".into(),
        format!("security-context: {security_header}"),
        "-d".into(),
        payload.into(),
        address.into(),
        method.into(),
    ]
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire messages
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `security-context` header payload. The organization is absent when the
/// calling workflow never had one in its environment.
#[derive(Debug, Serialize)]
pub struct SecurityContext {
    pub requestor_uuid: String,
    pub tenant_uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_uuid: Option<String>,
}

/// `ProcessContractEvents` request message.
#[derive(Debug, Serialize)]
pub struct ContractEventsBody {
    pub contract_uuid: String,
    pub c1_organization_uuid: String,
    pub c2_id: String,
    pub event_time: String,
}

/// `TriggerEvent` request message. Optional fields are dropped from the
/// JSON rather than sent as empty strings.
#[derive(Debug, Serialize)]
pub struct EventBody {
    pub widget_uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub c1_organization_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub c2_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_uuid: Option<String>,
    pub event_time: String,
    pub request_type: String,
    pub count: u32,
}

/// Timestamps on the wire are RFC 3339 with millisecond precision and a
/// trailing `Z`, e.g. `2024-01-15T14:00:00.000Z`.
pub fn wire_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response digest
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Default, Deserialize)]
struct MatcherResponse {
    #[serde(default)]
    term_matches: Vec<TermMatch>,
    #[serde(default)]
    term_match_errors: Vec<TermMatchError>,
}

#[derive(Debug, Deserialize)]
struct TermMatch {
    contract_uuid: Option<String>,
    sku_id: Option<String>,
    term_type: Option<String>,
    description: Option<String>,
    count: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TermMatchError {
    error: Option<String>,
}

/// Log the term matches and match errors from a `TriggerEvent` response.
/// Non-JSON output is logged verbatim.
pub fn log_response_summary(stdout: &str) {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        tracing::info!("matcher returned an empty response");
        return;
    }
    let Ok(response) = serde_json::from_str::<MatcherResponse>(trimmed) else {
        tracing::info!(response = trimmed, "matcher response (not JSON)");
        return;
    };
    tracing::info!(
        matches = response.term_matches.len(),
        errors = response.term_match_errors.len(),
        "matcher response parsed"
    );
    for m in &response.term_matches {
        tracing::info!(
            contract_uuid = m.contract_uuid.as_deref().unwrap_or("-"),
            sku_id = m.sku_id.as_deref().unwrap_or("-"),
            term_type = m.term_type.as_deref().unwrap_or("-"),
            description = m.description.as_deref().unwrap_or("-"),
            count = m.count.unwrap_or_default(),
            "term match"
        );
    }
    for e in &response.term_match_errors {
        tracing::warn!(error = e.error.as_deref().unwrap_or("unknown"), "term match error");
    }
}
