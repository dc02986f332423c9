//! Execution-time reconstruction of the nominal fire instant.
//!
//! A workflow step may run late, or run again on retry. Billing wants the
//! instant the schedule *meant*, not the wall clock, so the step derives one
//! candidate occurrence per stored schedule and picks the most recent one
//! that is not in the future. Month and weekday cron fields are ignored on
//! purpose: contract cadences are monthly, and the stored day-of-month (or
//! range start, for safety-rewritten schedules) fully determines the day.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};

use crate::clock::{self, CivilTime};
use crate::cron::{self, DayOfMonth};

/// A candidate nominal fire instant derived from one schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub schedule: String,
    pub at: DateTime<Utc>,
}

/// Derive one nominal occurrence per schedule, relative to `now` in `zone`.
///
/// An exact day or range start `D` targets day `D` of the current month when
/// `D` has already passed (or is today), otherwise day `D` of the previous
/// month, rolling the year back across January. An unconstrained day targets
/// today. Hour and minute come straight from the cron fields, defaulting
/// to 0.
pub fn occurrences(
    schedules: &[String],
    zone: chrono_tz::Tz,
    now: DateTime<Utc>,
) -> Vec<Occurrence> {
    let today = now.with_timezone(&zone).date_naive();
    let mut out = Vec::with_capacity(schedules.len());

    for schedule in schedules {
        let (minute, hour) = cron::minute_hour(schedule);
        let date = match cron::day_of_month(schedule) {
            DayOfMonth::Unconstrained => today,
            DayOfMonth::Exact(day) | DayOfMonth::RangeStart(day) => {
                let (year, month) = if day <= today.day() {
                    (today.year(), today.month())
                } else if today.month() == 1 {
                    (today.year() - 1, 12)
                } else {
                    (today.year(), today.month() - 1)
                };
                month_day(year, month, day).unwrap_or(today)
            }
        };

        let civil = CivilTime::new(date.year(), date.month(), date.day(), hour, minute);
        let conv = clock::local_to_utc(civil, zone);
        if !conv.exact {
            tracing::warn!(
                schedule = %schedule,
                at = %conv.instant,
                "schedule names a civil time that does not exist in the contract zone"
            );
        }
        tracing::debug!(schedule = %schedule, at = %conv.instant, "nominal occurrence candidate");
        out.push(Occurrence {
            schedule: schedule.clone(),
            at: conv.instant,
        });
    }

    out
}

/// Day `day` of the given month; overflow rolls forward into the next month.
fn month_day(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.checked_add_days(Days::new(u64::from(day.saturating_sub(1)))))
}

/// Resolve the nominal event time for a schedule list.
///
/// Total and deterministic in its three inputs: an unknown timezone falls
/// back to UTC with a warning, an empty schedule list falls back to midnight
/// of today in the zone, and candidate selection prefers the closest
/// occurrence at or before `now`, taking the earliest future occurrence only
/// when nothing has fired yet this cycle.
pub fn resolve(schedules: &[String], tz: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    let zone = if tz.is_empty() {
        chrono_tz::UTC
    } else {
        match tz.parse::<chrono_tz::Tz>() {
            Ok(zone) => zone,
            Err(_) => {
                tracing::warn!(timezone = tz, "unknown contract timezone, falling back to UTC");
                chrono_tz::UTC
            }
        }
    };

    let candidates = occurrences(schedules, zone, now);
    match closest(&candidates, now) {
        Some(occurrence) => {
            tracing::info!(
                schedule = %occurrence.schedule,
                event_time = %occurrence.at,
                "resolved nominal event time"
            );
            occurrence.at
        }
        None => {
            let today = now.with_timezone(&zone).date_naive();
            let midnight = clock::local_to_utc(
                CivilTime::new(today.year(), today.month(), today.day(), 0, 0),
                zone,
            );
            tracing::warn!(
                event_time = %midnight.instant,
                "no schedules supplied, defaulting to midnight today"
            );
            midnight.instant
        }
    }
}

/// The most recent occurrence at or before `now`, else the earliest future
/// one.
fn closest(candidates: &[Occurrence], now: DateTime<Utc>) -> Option<&Occurrence> {
    if let Some(past) = candidates
        .iter()
        .filter(|o| o.at <= now)
        .max_by_key(|o| o.at)
    {
        return Some(past);
    }
    let earliest = candidates.iter().min_by_key(|o| o.at);
    if let Some(occurrence) = earliest {
        tracing::warn!(
            schedule = %occurrence.schedule,
            at = %occurrence.at,
            "all candidates are in the future, using the earliest"
        );
    }
    earliest
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn schedules(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn first_of_month_already_fired_this_month() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let resolved = resolve(&schedules(&["0 0 1 * *"]), "UTC", now);
        assert_eq!(resolved, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn day_not_reached_falls_back_to_previous_month() {
        // The 20th has not happened in January yet, so the nominal fire was
        // December 20th of the prior year.
        let now = Utc.with_ymd_and_hms(2024, 1, 16, 0, 0, 0).unwrap();
        let resolved = resolve(&schedules(&["0 0 20 * *"]), "UTC", now);
        assert_eq!(resolved, Utc.with_ymd_and_hms(2023, 12, 20, 0, 0, 0).unwrap());
    }

    #[test]
    fn closest_past_candidate_wins() {
        let now = Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap();
        let resolved = resolve(&schedules(&["0 0 1 * *", "0 0 15 * *"]), "UTC", now);
        assert_eq!(resolved, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn resolution_is_deterministic() {
        let now = Utc.with_ymd_and_hms(2024, 5, 7, 13, 45, 0).unwrap();
        let list = schedules(&["0 0 1 * *", "30 9 15 * *", "0 12 * * *"]);
        let first = resolve(&list, "America/New_York", now);
        let second = resolve(&list, "America/New_York", now);
        assert_eq!(first, second);
    }

    #[test]
    fn hour_and_minute_come_from_the_schedule() {
        let now = Utc.with_ymd_and_hms(2024, 7, 10, 0, 0, 0).unwrap();
        let resolved = resolve(&schedules(&["45 18 3 * *"]), "UTC", now);
        assert_eq!(resolved, Utc.with_ymd_and_hms(2024, 7, 3, 18, 45, 0).unwrap());
    }

    #[test]
    fn unconstrained_day_targets_today() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let resolved = resolve(&schedules(&["30 9 * * *"]), "UTC", now);
        assert_eq!(resolved, Utc.with_ymd_and_hms(2024, 6, 15, 9, 30, 0).unwrap());
    }

    #[test]
    fn star_fields_default_to_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let resolved = resolve(&schedules(&["* * 5 * *"]), "UTC", now);
        assert_eq!(resolved, Utc.with_ymd_and_hms(2024, 6, 5, 0, 0, 0).unwrap());
    }

    #[test]
    fn future_only_candidate_is_used_with_warning() {
        // The 15th is today but 23:00 is still ahead of a 01:00 now.
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 1, 0, 0).unwrap();
        let resolved = resolve(&schedules(&["0 23 15 * *"]), "UTC", now);
        assert_eq!(resolved, Utc.with_ymd_and_hms(2024, 1, 15, 23, 0, 0).unwrap());
    }

    #[test]
    fn empty_schedule_list_defaults_to_local_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let resolved = resolve(&[], "America/New_York", now);
        // Midnight June 15 in New York is 04:00 UTC.
        assert_eq!(resolved, Utc.with_ymd_and_hms(2024, 6, 15, 4, 0, 0).unwrap());
    }

    #[test]
    fn contract_zone_decides_what_today_means() {
        // 02:00 UTC on June 15 is still June 14 evening in New York, so the
        // 10th targets June 10 in local time (04:00 UTC at EDT).
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 2, 0, 0).unwrap();
        let resolved = resolve(&schedules(&["0 0 10 * *"]), "America/New_York", now);
        assert_eq!(resolved, Utc.with_ymd_and_hms(2024, 6, 10, 4, 0, 0).unwrap());
    }

    #[test]
    fn range_start_is_the_nominal_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 29, 12, 0, 0).unwrap();
        let resolved = resolve(&schedules(&["0 0 28-31 * *"]), "UTC", now);
        assert_eq!(resolved, Utc.with_ymd_and_hms(2024, 3, 28, 0, 0, 0).unwrap());
    }

    #[test]
    fn unknown_timezone_falls_back_to_utc() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let resolved = resolve(&schedules(&["0 0 1 * *"]), "Invalid/Zone", now);
        assert_eq!(resolved, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn day_overflow_rolls_into_next_month() {
        // Day 31 against April (previous month of a mid-May now) rolls to
        // May 1, which has then already fired.
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 0, 0, 0).unwrap();
        let resolved = resolve(&schedules(&["0 0 31 * *"]), "UTC", now);
        assert_eq!(resolved, Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn dst_gap_schedule_degrades_to_closest_instant() {
        // 02:30 on March 10 does not exist in New York; the resolver still
        // produces a deterministic instant (the moment right after the jump).
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let resolved = resolve(&schedules(&["30 2 10 * *"]), "America/New_York", now);
        assert_eq!(resolved, Utc.with_ymd_and_hms(2024, 3, 10, 7, 0, 0).unwrap());
    }

    #[test]
    fn occurrences_keep_schedule_association() {
        let now = Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap();
        let occ = occurrences(
            &schedules(&["0 0 1 * *", "0 0 15 * *"]),
            chrono_tz::UTC,
            now,
        );
        assert_eq!(occ.len(), 2);
        assert_eq!(occ[0].schedule, "0 0 1 * *");
        assert_eq!(occ[0].at, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(occ[1].at, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
    }
}
