//! Workflow-step client for the usage term matcher.
//!
//! Runs as a step inside a generated contract DAG and forwards the
//! contract context from the step environment to
//! `service.v1.TriggerMatcherService` via `grpcurl`:
//!
//! - `contract-events` — nominal-time contract processing; the event time
//!   is reconstructed from the stored schedules so a retried or delayed
//!   run reports the instant the schedule meant, not the wall clock.
//! - `event`           — single usage event; the event time comes from
//!   the workflow run id.
//!
//! Usage:
//!   CONTRACT_UUID=... ORGANIZATION_UUID=... CUSTOMER_ID=... \
//!   REQUESTOR_UUID=... TENANT_UUID=... cadence-trigger contract-events
//!
//! Env vars (written by the gateway into every generated document):
//!   ORGANIZATION_UUID, CUSTOMER_ID, CONTRACT_UUID,
//!   REQUESTOR_UUID, TENANT_UUID       — contract and caller identity
//!   SCHEDULES                         — JSON array of stored cron schedules
//!   CONTRACT_TIMEZONE                 — zone those schedules are written in
//!   SKU_ID, WIDGET_UUID, REQUEST_TYPE — usage-event parameters
//!   USAGE_TERM_MATCHER_HOST / _PORT   — matcher endpoint override
//!   DAG_RUN_ID                        — injected by the workflow engine

mod context;
mod matcher;

use cadence_schedule::resolve;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::context::{ContractEventsContext, EventContext};
use crate::matcher::{ContractEventsBody, EventBody, MatcherEndpoint, SecurityContext};

/// cadence-trigger — workflow step client for the usage term matcher.
#[derive(Debug, Parser)]
#[command(name = "cadence-trigger", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve the nominal fire time from the stored schedules and call
    /// ProcessContractEvents.
    ContractEvents,
    /// Derive the event time from the run id and call TriggerEvent.
    Event,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays readable in step output captures.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match Cli::parse().command {
        Command::ContractEvents => run_contract_events().await,
        Command::Event => run_event().await,
    }
}

async fn run_contract_events() -> anyhow::Result<()> {
    let schedules = context::schedules_from_env();
    let timezone = context::contract_timezone();
    let event_time = resolve(&schedules, &timezone, Utc::now());

    let endpoint = MatcherEndpoint::from_env();
    let ctx = ContractEventsContext::from_env()?;
    tracing::info!(
        contract_uuid = %ctx.contract_uuid,
        timezone = %timezone,
        event_time = %matcher::wire_timestamp(event_time),
        address = %endpoint.address(),
        "processing contract events"
    );

    let security = SecurityContext {
        requestor_uuid: ctx.requestor_uuid.clone(),
        tenant_uuid: ctx.tenant_uuid.clone(),
        organization_uuid: Some(ctx.organization_uuid.clone()),
    };
    let body = ContractEventsBody {
        contract_uuid: ctx.contract_uuid,
        c1_organization_uuid: ctx.organization_uuid,
        c2_id: ctx.customer_id,
        event_time: matcher::wire_timestamp(event_time),
    };
    let stdout = endpoint
        .call(matcher::PROCESS_CONTRACT_EVENTS, &security, &body)
        .await?;
    tracing::info!(response = %stdout.trim(), "contract events accepted");
    Ok(())
}

async fn run_event() -> anyhow::Result<()> {
    let event_time = context::event_time_from_run_id(context::run_id().as_deref(), Utc::now());

    let endpoint = MatcherEndpoint::from_env();
    let ctx = EventContext::from_env()?;
    tracing::info!(
        request_type = %ctx.request_type,
        widget_uuid = %ctx.widget_uuid,
        contract_uuid = ctx.contract_uuid.as_deref().unwrap_or("-"),
        event_time = %matcher::wire_timestamp(event_time),
        address = %endpoint.address(),
        "triggering usage event"
    );

    let security = SecurityContext {
        requestor_uuid: ctx.requestor_uuid.clone(),
        tenant_uuid: ctx.tenant_uuid.clone(),
        organization_uuid: ctx.organization_uuid.clone(),
    };
    let body = EventBody {
        widget_uuid: ctx.widget_uuid,
        sku_id: ctx.sku_id,
        c1_organization_uuid: ctx.organization_uuid,
        c2_id: ctx.customer_id,
        contract_uuid: ctx.contract_uuid,
        event_time: matcher::wire_timestamp(event_time),
        request_type: ctx.request_type,
        count: 1,
    };
    let stdout = endpoint
        .call(matcher::TRIGGER_EVENT, &security, &body)
        .await?;
    matcher::log_response_summary(&stdout);
    Ok(())
}
