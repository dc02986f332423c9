//! cadence-gateway — the HTTP service that manages billing cadence DAG
//! files for the external Dagu scheduler.
//!
//! A request names a contract and a cadence kind; the gateway validates
//! it, normalizes the cron schedules (end-of-month rewriting plus the
//! fire-day precondition), renders the YAML document the scheduler
//! consumes, and maintains that file on disk. The schedule math lives in
//! `cadence-schedule`, shared with the `cadence-trigger` binary the
//! rendered steps invoke.

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod runtime;
pub mod state;
