//! Day-of-month classification for 5-field cron expressions (min hour dom month dow).
//!
//! This is deliberately not a cron parser. Monthly contract schedules only
//! ever constrain the day-of-month with a bare day or a day range, so that is
//! all the classification distinguishes; steps, lists and weekday tricks fall
//! through to [`DayOfMonth::Unconstrained`] and keep their native meaning.

/// Classification of the day-of-month field of a cron expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOfMonth {
    /// A bare day number, e.g. the `29` in `0 0 29 * *`.
    Exact(u32),
    /// The start of a numeric range, e.g. the `28` in `0 0 28-31 * *`.
    RangeStart(u32),
    /// `*`, lists, steps, out-of-range values, malformed input.
    Unconstrained,
}

/// Classify the day-of-month field of `cron`.
///
/// Total: malformed input classifies as [`DayOfMonth::Unconstrained`] rather
/// than failing. `Exact`/`RangeStart` values are always in `1..=31`.
pub fn day_of_month(cron: &str) -> DayOfMonth {
    let fields: Vec<&str> = cron.split_whitespace().collect();
    if fields.len() < 3 {
        tracing::warn!(
            cron,
            "cron expression has fewer than 3 fields, day-of-month treated as unconstrained"
        );
        return DayOfMonth::Unconstrained;
    }
    classify_day_field(fields[2])
}

fn classify_day_field(field: &str) -> DayOfMonth {
    if let Ok(n) = field.parse::<u32>() {
        if (1..=31).contains(&n) {
            return DayOfMonth::Exact(n);
        }
        return DayOfMonth::Unconstrained;
    }
    // Lists and steps keep their native cron meaning, even when a range is
    // buried inside them.
    if field.contains(',') || field.contains('/') {
        return DayOfMonth::Unconstrained;
    }
    if let Some((start_s, end_s)) = field.split_once('-') {
        if let (Ok(start), Ok(_end)) = (start_s.parse::<u32>(), end_s.parse::<u32>()) {
            if (1..=31).contains(&start) {
                return DayOfMonth::RangeStart(start);
            }
        }
    }
    DayOfMonth::Unconstrained
}

/// Extract `(minute, hour)` from a cron expression.
///
/// Either component defaults to 0 when its field is `*`, missing, out of
/// range or otherwise unparseable.
pub fn minute_hour(cron: &str) -> (u32, u32) {
    let mut fields = cron.split_whitespace();
    let minute = fields
        .next()
        .and_then(|f| f.parse::<u32>().ok())
        .filter(|m| *m <= 59)
        .unwrap_or(0);
    let hour = fields
        .next()
        .and_then(|f| f.parse::<u32>().ok())
        .filter(|h| *h <= 23)
        .unwrap_or(0);
    (minute, hour)
}
