//! Civil time in a timezone, and civil-to-UTC conversion.
//!
//! `chrono-tz` answers "what civil time is instant X in zone Z"; the other
//! direction is done with a bounded search so that nonexistent civil times
//! (DST forward jumps) degrade to the closest real instant instead of
//! failing. The search scans a ±16 hour window in 15-minute steps and walks
//! minute-by-minute once it lands in the right civil hour, which keeps the
//! worst case around 160 zone conversions.

use cadence_domain::{Error, Result};
use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};

/// Civil date and time components in some timezone, minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

impl CivilTime {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
        }
    }

    /// The naive datetime these fields name, plus whether they named a real
    /// calendar date. Day overflow rolls forward into the next month (day 31
    /// of a 30-day month becomes the 1st of the following month).
    fn to_naive(self) -> (NaiveDateTime, bool) {
        let exact = NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .and_then(|d| d.and_hms_opt(self.hour, self.minute, 0));
        if let Some(dt) = exact {
            return (dt, true);
        }
        let rolled = NaiveDate::from_ymd_opt(self.year, self.month.clamp(1, 12), 1)
            .and_then(|first| first.checked_add_days(Days::new(u64::from(self.day.saturating_sub(1)))))
            .and_then(|d| d.and_hms_opt(self.hour.min(23), self.minute.min(59), 0))
            .unwrap_or_default();
        (rolled, false)
    }
}

/// The outcome of a civil-to-UTC conversion.
///
/// `exact` means re-deriving the civil fields of `instant` in the requested
/// zone reproduces the input exactly. Approximate results come from civil
/// times that do not exist in the zone and land on the closest real instant.
#[derive(Debug, Clone, Copy)]
pub struct LocalConversion {
    pub instant: DateTime<Utc>,
    pub exact: bool,
}

/// Parse a timezone string into a `chrono_tz::Tz`, falling back to UTC.
pub fn parse_tz(tz: &str) -> chrono_tz::Tz {
    tz.parse::<chrono_tz::Tz>().unwrap_or(chrono_tz::UTC)
}

/// Current civil components in the given zone.
pub fn now_components(tz: &str) -> Result<CivilTime> {
    let zone: chrono_tz::Tz = tz.parse().map_err(|_| {
        Error::Config(format!(
            "unknown timezone '{tz}', use IANA names like 'America/New_York' or 'UTC'"
        ))
    })?;
    Ok(civil_of(&Utc::now().with_timezone(&zone)))
}

/// Convert civil time in a zone to the UTC instant it names.
///
/// UTC short-circuits to direct construction. Any other zone is searched:
/// starting from the zero-offset estimate (the civil fields read as UTC),
/// candidates 15 minutes apart across ±16 hours are converted back into the
/// zone until one lands in the target civil hour, then a ±15 minute
/// 1-minute-step walk pins the exact minute. Ambiguous civil times
/// (DST fall-back) resolve to the earliest instant because the scan runs
/// oldest-first. When no candidate reproduces the civil fields, the
/// closest candidate is returned with `exact: false`.
pub fn local_to_utc(civil: CivilTime, tz: chrono_tz::Tz) -> LocalConversion {
    let (target, represents_input) = civil.to_naive();
    if tz == chrono_tz::UTC {
        return LocalConversion {
            instant: Utc.from_utc_datetime(&target),
            exact: represents_input,
        };
    }

    let estimate = Utc.from_utc_datetime(&target);
    let mut best: Option<(DateTime<Utc>, i64)> = None;
    let steps = 16 * 4_i64;
    for k in -steps..=steps {
        let cand = estimate + Duration::minutes(k * 15);
        let local = truncated_local(&cand, tz);
        if local.date() == target.date() && local.hour() == target.hour() {
            // Right civil hour: walk to the exact minute.
            for m in -15..=15_i64 {
                let fine = cand + Duration::minutes(m);
                if truncated_local(&fine, tz) == target {
                    return LocalConversion {
                        instant: fine,
                        exact: represents_input,
                    };
                }
            }
        }
        let dist = (local - target).num_seconds().abs();
        if best.map_or(true, |(_, d)| dist < d) {
            best = Some((cand, dist));
        }
    }

    let (instant, _) = best.unwrap_or((estimate, 0));
    tracing::warn!(
        year = civil.year,
        month = civil.month,
        day = civil.day,
        hour = civil.hour,
        minute = civil.minute,
        zone = %tz,
        chosen = %instant,
        "civil time has no exact instant in this zone, using the closest candidate"
    );
    LocalConversion {
        instant,
        exact: false,
    }
}

/// Civil representation of `instant` in `tz`, truncated to the minute.
fn truncated_local(instant: &DateTime<Utc>, tz: chrono_tz::Tz) -> NaiveDateTime {
    let local = instant.with_timezone(&tz).naive_local();
    local
        .with_second(0)
        .and_then(|l| l.with_nanosecond(0))
        .unwrap_or(local)
}

fn civil_of<Z: TimeZone>(dt: &DateTime<Z>) -> CivilTime {
    CivilTime::new(dt.year(), dt.month(), dt.day(), dt.hour(), dt.minute())
}
