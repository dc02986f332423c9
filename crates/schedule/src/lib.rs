//! Calendar-aware schedule handling for monthly contract events.
//!
//! Cron expressions with a day-of-month of 29, 30 or 31 silently never fire
//! in months that are too short. This crate covers both ends of the problem:
//!
//! - [`normalize`] — Authoring-time rewrite of unsafe day-of-month values to
//!   `28-31` plus construction of the gating precondition that restricts the
//!   rewritten schedule to the day the author meant.
//! - [`resolve`] — Execution-time reconstruction of the *nominal* fire
//!   instant from the stored schedules, the contract timezone and the
//!   current instant, so retried or delayed runs report the same
//!   `event_time`.
//!
//! Split into submodules:
//! - [`cron`] — Day-of-month classification and minute/hour extraction
//! - [`normalize`] — Schedule rewriting and precondition construction
//! - [`clock`] — Civil time in a timezone, and civil-to-UTC conversion
//! - [`resolve`] — Nominal occurrence candidates and selection

pub mod clock;
pub mod cron;
pub mod normalize;
pub mod resolve;

pub use clock::{local_to_utc, now_components, parse_tz, CivilTime, LocalConversion};
pub use cron::{day_of_month, minute_hour, DayOfMonth};
pub use normalize::{normalize, NormalizedSchedules, Precondition};
pub use resolve::{occurrences, resolve, Occurrence};
