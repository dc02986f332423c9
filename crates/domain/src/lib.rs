//! Shared domain types for the Cadence workspace: configuration and the
//! common error type used by the gateway and the trigger client.

pub mod config;
pub mod error;

pub use error::{Error, Result};
