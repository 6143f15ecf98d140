//! Time utilities: timezone-aware conversions and week math for review.

use anyhow::Result;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Convert a local wall-clock instant in an IANA tz like "America/Chicago"
/// to UTC. Fails on ambiguous or skipped local times (DST transitions).
pub fn local_to_utc(local: NaiveDateTime, tz: &str) -> Result<DateTime<Utc>> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))?;

    let local_dt = tz
        .from_local_datetime(&local)
        .single()
        .ok_or_else(|| anyhow::anyhow!("ambiguous or invalid local time (DST?): {local} {tz}"))?;

    Ok(local_dt.with_timezone(&Utc))
}

/// Current wall clock in an IANA timezone, for feeding the quick-add parser.
pub fn local_now(tz: &str) -> Result<NaiveDateTime> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))?;
    Ok(Utc::now().with_timezone(&tz).naive_local())
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Sunday of the week containing `date`.
pub fn week_end(date: NaiveDate) -> NaiveDate {
    week_start(date) + Duration::days(6)
}

/// ISO week string, e.g. "2024-W42".
pub fn week_iso(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

/// Display range for a review header, e.g. "Week of Oct 14 - Oct 20, 2024".
pub fn format_week_range(date: NaiveDate) -> String {
    let start = week_start(date);
    let end = week_end(date);
    format!(
        "Week of {} - {}, {}",
        start.format("%b %-d"),
        end.format("%b %-d"),
        start.year()
    )
}
