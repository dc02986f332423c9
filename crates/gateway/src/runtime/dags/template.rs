//! DAG document templating — renders a cadence request into Dagu YAML.
//!
//! The document is the unit the scheduler consumes: cron schedule(s), an
//! optional fire-day precondition, the env block the trigger step reads,
//! and the step itself.

use serde::{Deserialize, Serialize};

use cadence_domain::config::Config;
use cadence_domain::Result;
use cadence_schedule::{normalize, NormalizedSchedules, Precondition};

use super::model::{CadenceEventRequest, RequestType, ScheduleInput};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Document model
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One executable step of a DAG.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DagStep {
    pub name: String,
    pub command: String,
    pub executor: String,
}

/// Schedule field of a document — the scheduler accepts a single cron
/// string or a list.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DocumentSchedule {
    One(String),
    Many(Vec<String>),
}

/// A Dagu DAG definition. Field order is the order operators expect to
/// see when diffing the files on disk.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DagDocument {
    pub name: String,
    pub description: String,
    pub schedule: DocumentSchedule,
    #[serde(default)]
    pub preconditions: Vec<Precondition>,
    pub env: Vec<String>,
    pub steps: Vec<DagStep>,
}

impl DagDocument {
    pub fn render(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn parse(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Rendering
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Render a validated request into a document named `dag_name`.
///
/// Schedules pass through [`cadence_schedule::normalize`] first, so
/// end-of-month day fields (`29`/`30`/`31`) arrive on disk as `28-31`
/// plus a fire-day precondition evaluated in the contract timezone.
pub fn build_document(
    req: &CadenceEventRequest,
    config: &Config,
    dag_name: &str,
) -> Result<DagDocument> {
    let supplied_list = matches!(req.schedule, Some(ScheduleInput::Many(_)));
    let requested = req.schedules_or(&config.scheduling.default_schedule);
    let NormalizedSchedules {
        schedules,
        precondition,
    } = normalize(&requested, &req.contract_timezone);

    let mut env = vec![
        format!("USAGE_TERM_MATCHER_HOST={}", config.matcher.host),
        format!("USAGE_TERM_MATCHER_PORT={}", config.matcher.port),
        format!("ORGANIZATION_UUID={}", req.organization_uuid),
        format!("CUSTOMER_ID={}", req.customer_id),
        format!("CONTRACT_UUID={}", req.contract_uuid),
    ];
    if let Some(sku) = &req.sku_id {
        env.push(format!("SKU_ID={sku}"));
    }
    if let Some(widget) = &req.widget_uuid {
        env.push(format!("WIDGET_UUID={widget}"));
    }
    env.push(format!("REQUEST_TYPE={}", req.request_type));
    env.push(format!("REQUESTOR_UUID={}", req.requestor_uuid));
    env.push(format!("TENANT_UUID={}", req.tenant_uuid));
    if req.request_type == RequestType::ProcessContractEvents {
        // The trigger step re-derives the nominal fire time from these,
        // so they must carry the rewritten schedule strings.
        env.push(format!("CONTRACT_TIMEZONE={}", req.contract_timezone));
        env.push(format!("SCHEDULES={}", serde_json::to_string(&schedules)?));
    }
    env.extend(req.additional_env.iter().cloned());

    let steps = match &req.custom_steps {
        Some(custom) if !custom.is_empty() => custom.clone(),
        _ => vec![trigger_step(req.request_type)],
    };

    let schedule = if supplied_list {
        DocumentSchedule::Many(schedules)
    } else {
        DocumentSchedule::One(schedules.into_iter().next().unwrap_or_default())
    };

    Ok(DagDocument {
        name: dag_name.to_string(),
        description: req.description.clone().unwrap_or_else(|| {
            format!(
                "{} workflow for contract {}",
                req.request_type, req.contract_uuid
            )
        }),
        schedule,
        preconditions: vec![precondition],
        env,
        steps,
    })
}

fn trigger_step(request_type: RequestType) -> DagStep {
    let command = match request_type {
        RequestType::ProcessContractEvents => "cadence-trigger contract-events",
        _ => "cadence-trigger event",
    };
    DagStep {
        name: "call-usage-term-matcher".into(),
        command: command.into(),
        executor: "shell".into(),
    }
}
