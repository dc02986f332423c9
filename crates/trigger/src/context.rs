//! Contract context from the workflow environment.
//!
//! Every variable read here was written into the DAG document by the
//! gateway (or injected by the workflow engine itself, in the case of
//! `DAG_RUN_ID`). Empty values are treated as unset throughout.

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeZone, Utc};

pub const VALID_REQUEST_TYPES: [&str; 3] =
    ["seat_license", "generate_invoice", "seat_license_daily"];

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Per-subcommand context
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Identifiers the `contract-events` subcommand must have. All five are
/// required; the first missing one aborts the step.
#[derive(Debug)]
pub struct ContractEventsContext {
    pub requestor_uuid: String,
    pub tenant_uuid: String,
    pub contract_uuid: String,
    pub organization_uuid: String,
    pub customer_id: String,
}

impl ContractEventsContext {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            requestor_uuid: required("REQUESTOR_UUID")?,
            tenant_uuid: required("TENANT_UUID")?,
            contract_uuid: required("CONTRACT_UUID")?,
            organization_uuid: required("ORGANIZATION_UUID")?,
            customer_id: required("CUSTOMER_ID")?,
        })
    }
}

/// Context for the `event` subcommand. Only the widget and the caller
/// identity are hard requirements; the contract identifiers are forwarded
/// when present and omitted from the request otherwise.
#[derive(Debug)]
pub struct EventContext {
    pub request_type: String,
    pub widget_uuid: String,
    pub requestor_uuid: String,
    pub tenant_uuid: String,
    pub sku_id: Option<String>,
    pub organization_uuid: Option<String>,
    pub customer_id: Option<String>,
    pub contract_uuid: Option<String>,
}

impl EventContext {
    pub fn from_env() -> Result<Self> {
        let request_type = optional("REQUEST_TYPE").unwrap_or_default();
        if !VALID_REQUEST_TYPES.contains(&request_type.as_str()) {
            anyhow::bail!(
                "Invalid request type: {request_type} (valid request types: {})",
                VALID_REQUEST_TYPES.join(", ")
            );
        }
        Ok(Self {
            request_type,
            widget_uuid: required("WIDGET_UUID")?,
            requestor_uuid: required("REQUESTOR_UUID")?,
            tenant_uuid: required("TENANT_UUID")?,
            sku_id: optional("SKU_ID"),
            organization_uuid: optional("ORGANIZATION_UUID"),
            customer_id: optional("CUSTOMER_ID"),
            contract_uuid: optional("CONTRACT_UUID"),
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Schedules and event time
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The schedule list the gateway baked into the document, read from
/// `SCHEDULES` with the legacy single-string `SCHEDULE` as fallback.
pub fn schedules_from_env() -> Vec<String> {
    let raw = optional("SCHEDULES");
    let legacy = optional("SCHEDULE");
    parse_schedules(raw.as_deref(), legacy.as_deref())
}

/// Decode the `SCHEDULES` value: a JSON array of cron strings, a JSON
/// string, or (for hand-edited documents) a bare cron expression that is
/// not JSON at all. A missing value falls back to the legacy variable.
pub fn parse_schedules(raw: Option<&str>, legacy: Option<&str>) -> Vec<String> {
    if let Some(raw) = raw {
        if let Ok(list) = serde_json::from_str::<Vec<String>>(raw) {
            return list;
        }
        if let Ok(single) = serde_json::from_str::<String>(raw) {
            return vec![single];
        }
        tracing::error!(raw, "SCHEDULES is not valid JSON, treating it as one cron expression");
        return vec![raw.to_string()];
    }
    if let Some(legacy) = legacy {
        tracing::warn!("SCHEDULES not set, using legacy SCHEDULE variable");
        return vec![legacy.to_string()];
    }
    Vec::new()
}

/// Timezone the contract schedules are written in, `UTC` when unset.
pub fn contract_timezone() -> String {
    optional("CONTRACT_TIMEZONE").unwrap_or_else(|| "UTC".into())
}

/// The workflow engine's run id for this execution, if any.
pub fn run_id() -> Option<String> {
    optional("DAG_RUN_ID")
}

/// Recover the nominal fire time from a workflow run id of the form
/// `YYYYMMDD_HHMMSS_xxxxxx` (interpreted as UTC). A malformed id degrades
/// to `now`; a missing one degrades to midnight today.
pub fn event_time_from_run_id(run_id: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let Some(run_id) = run_id else {
        let midnight = Utc.from_utc_datetime(&now.date_naive().and_time(NaiveTime::MIN));
        tracing::warn!(event_time = %midnight, "DAG_RUN_ID not set, defaulting to midnight today");
        return midnight;
    };
    let parsed = run_id
        .get(..15)
        .and_then(|stamp| NaiveDateTime::parse_from_str(stamp, "%Y%m%d_%H%M%S").ok());
    match parsed {
        Some(stamp) => {
            let at = Utc.from_utc_datetime(&stamp);
            tracing::info!(run_id, event_time = %at, "derived event time from run id");
            at
        }
        None => {
            tracing::warn!(run_id, "run id does not start with a YYYYMMDD_HHMMSS stamp, using current time");
            now
        }
    }
}

// ── Env helpers ───────────────────────────────────────────────────────

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn required(name: &str) -> Result<String> {
    optional(name).ok_or_else(|| anyhow::anyhow!("{name} environment variable is required"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn schedules_json_array() {
        let got = parse_schedules(Some(r#"["0 0 28-31 * *","0 12 1 * *"]"#), None);
        assert_eq!(got, vec!["0 0 28-31 * *".to_string(), "0 12 1 * *".to_string()]);
    }

    #[test]
    fn schedules_json_string_is_wrapped() {
        let got = parse_schedules(Some(r#""0 0 1 * *""#), None);
        assert_eq!(got, vec!["0 0 1 * *".to_string()]);
    }

    #[test]
    fn schedules_bare_cron_is_wrapped() {
        let got = parse_schedules(Some("0 0 15 * *"), None);
        assert_eq!(got, vec!["0 0 15 * *".to_string()]);
    }

    #[test]
    fn schedules_legacy_fallback() {
        let got = parse_schedules(None, Some("0 0 1 * *"));
        assert_eq!(got, vec!["0 0 1 * *".to_string()]);
    }

    #[test]
    fn schedules_absent() {
        assert!(parse_schedules(None, None).is_empty());
    }

    #[test]
    fn run_id_stamp_wins_over_now() {
        let now = at(2024, 1, 20, 9, 30, 0);
        let got = event_time_from_run_id(Some("20240115_140000_abc123"), now);
        assert_eq!(got, at(2024, 1, 15, 14, 0, 0));
    }

    #[test]
    fn malformed_run_id_uses_now() {
        let now = at(2024, 1, 20, 9, 30, 0);
        assert_eq!(event_time_from_run_id(Some("manual-run"), now), now);
        assert_eq!(event_time_from_run_id(Some("2024"), now), now);
    }

    #[test]
    fn missing_run_id_uses_midnight_today() {
        let now = at(2024, 1, 20, 9, 30, 0);
        assert_eq!(event_time_from_run_id(None, now), at(2024, 1, 20, 0, 0, 0));
    }
}
