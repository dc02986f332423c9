//! Runtime services behind the HTTP API.
//!
//! Today that is DAG lifecycle management; the schedule math itself lives
//! in the `cadence-schedule` crate so the trigger binary can share it.

pub mod dags;
