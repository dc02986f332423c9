//! Authoring-time schedule rewriting and precondition construction.
//!
//! A cron day-of-month of 29, 30 or 31 never fires in months shorter than
//! that day. Normalization rewrites such schedules to `28-31` so the
//! scheduler fires in every month, and pairs them with a precondition that
//! lets the run proceed only on the day that stands in for the author's
//! intent: the literal day when the month has it, the last day of the month
//! when it does not.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::cron::{self, DayOfMonth};

/// A scheduler gate: `condition` is evaluated externally (backtick command
/// substitution for shell sequences, literal comparison otherwise) and the
/// run proceeds when its output equals `expected`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precondition {
    pub condition: String,
    pub expected: String,
}

impl Precondition {
    /// The gate that always passes: a literal compared against itself.
    pub fn always() -> Self {
        Self {
            condition: "true".into(),
            expected: "true".into(),
        }
    }

    pub fn is_always(&self) -> bool {
        self.condition == "true"
    }

    /// Gate on the edge days, evaluated in the contract timezone. The shell
    /// sequence computes today's and tomorrow's day-of-month and prints
    /// exactly `true` or `false`.
    fn edge_day_gate(edge_days: &BTreeSet<u32>, zone: &str) -> Self {
        let clauses: Vec<String> = edge_days.iter().map(|d| day_clause(*d)).collect();
        let condition = format!(
            "`t=$(TZ='{zone}' date +%d); tm=$(TZ='{zone}' date -d tomorrow +%d); \
             if {}; then echo true; else echo false; fi`",
            clauses.join(" || ")
        );
        Self {
            condition,
            expected: "true".into(),
        }
    }
}

/// The fire-day test for one edge day: true exactly when today is the day
/// the original schedule meant, accounting for months that end early.
fn day_clause(day: u32) -> String {
    match day {
        // Day 31 only ever fires on the last day of the month.
        31 => r#"[ "$tm" -eq 1 ]"#.into(),
        // Day 29 is only ever missing in February, where the 28th stands in.
        29 => r#"[ "$t" -eq 29 ] || { [ "$t" -eq 28 ] && [ "$tm" -eq 1 ]; }"#.into(),
        // Day 28/30: the literal day, or the last day of a month that ends
        // before it. Day 28 exists in every month, so its second arm is
        // unreachable and kept for symmetry.
        d => format!(
            r#"[ "$t" -eq {d} ] || {{ [ "$tm" -eq 1 ] && [ "$t" -lt {d} ]; }}"#
        ),
    }
}

/// The result of normalizing a schedule list: the rewritten schedule strings
/// (same order and length as the input) and the precondition to attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSchedules {
    pub schedules: Vec<String>,
    pub precondition: Precondition,
}

/// Rewrite unsafe day-of-month values and build the gating precondition.
///
/// Schedules with an exact day of 29, 30 or 31 have that field (and only
/// that field) replaced with `28-31`. Edge days are collected from exact
/// days 29-31 and from range starts 28-31, so a previously rewritten
/// `28-31` schedule keeps its gate when normalized again. Everything else
/// passes through untouched.
///
/// With more than one schedule the precondition is unconditionally the
/// always-true gate: a single shared gate cannot express per-schedule fire
/// days, so multi-schedule documents rely on the rewritten expressions
/// alone. This is a known limitation of the document format.
pub fn normalize(schedules: &[String], tz: &str) -> NormalizedSchedules {
    let mut rewritten = Vec::with_capacity(schedules.len());
    let mut edge_days: BTreeSet<u32> = BTreeSet::new();

    for schedule in schedules {
        match cron::day_of_month(schedule) {
            DayOfMonth::Exact(day) if (29..=31).contains(&day) => {
                edge_days.insert(day);
                let safe = rewrite_day_field(schedule);
                tracing::info!(from = %schedule, to = %safe, "rewrote end-of-month schedule");
                rewritten.push(safe);
            }
            DayOfMonth::RangeStart(day) if (28..=31).contains(&day) => {
                edge_days.insert(day);
                rewritten.push(schedule.clone());
            }
            _ => rewritten.push(schedule.clone()),
        }
    }

    let precondition = if edge_days.is_empty() {
        Precondition::always()
    } else if schedules.len() > 1 {
        tracing::warn!(
            count = schedules.len(),
            "multiple schedules share one precondition slot, emitting an always-true gate"
        );
        Precondition::always()
    } else {
        let zone = crate::clock::parse_tz(tz);
        if zone == chrono_tz::UTC && tz != "UTC" && !tz.is_empty() {
            tracing::warn!(timezone = tz, "unknown timezone for precondition, using UTC");
        }
        Precondition::edge_day_gate(&edge_days, zone.name())
    };

    NormalizedSchedules {
        schedules: rewritten,
        precondition,
    }
}

/// Replace the day-of-month field with `28-31`, leaving every other field
/// byte-identical.
fn rewrite_day_field(cron: &str) -> String {
    let mut fields: Vec<&str> = cron.split_whitespace().collect();
    if fields.len() >= 3 {
        fields[2] = "28-31";
    }
    fields.join(" ")
}
