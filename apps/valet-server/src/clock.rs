//! Korea Standard Time helpers.
//!
//! The bot reports on Korean holidays and weather, and its standup week
//! starts on Monday midnight KST, so all date arithmetic happens in the
//! fixed UTC+9 offset regardless of where the process runs.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDateTime, Timelike, Utc, Weekday};

/// KST is UTC+09:00.
const KST_OFFSET_SECS: i32 = 9 * 60 * 60;

/// Returns the KST fixed offset.
pub fn zone() -> FixedOffset {
    FixedOffset::east_opt(KST_OFFSET_SECS).expect("KST offset is in range")
}

/// Returns the current time in KST.
pub fn now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&zone())
}

/// Converts a Unix timestamp (seconds, possibly fractional) to KST.
pub fn from_timestamp(ts: f64) -> DateTime<FixedOffset> {
    DateTime::from_timestamp(ts as i64, 0)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .with_timezone(&zone())
}

/// Returns midnight of the most recent Monday at or before `t`.
///
/// # Examples
///
/// ```
/// use chrono::TimeZone;
/// use valet_server::clock;
///
/// // Wednesday 2025-01-01 10:30 KST → Monday 2024-12-30 00:00 KST.
/// let wednesday = clock::zone().with_ymd_and_hms(2025, 1, 1, 10, 30, 0).unwrap();
/// let monday = clock::last_monday(wednesday);
/// assert_eq!(monday.to_rfc3339(), "2024-12-30T00:00:00+09:00");
/// ```
pub fn last_monday(t: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    let days_back = i64::from(t.weekday().num_days_from_monday());
    let seconds_into_day = i64::from(t.num_seconds_from_midnight());
    let nanos = i64::from(t.nanosecond());
    t - Duration::days(days_back)
        - Duration::seconds(seconds_into_day)
        - Duration::nanoseconds(nanos)
}

/// Short English label for a weekday.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// Short English label for the weekday of `t`.
pub fn weekday_label(t: &DateTime<FixedOffset>) -> &'static str {
    weekday_name(t.weekday())
}

/// Parses a forecast timestamp in the portal's `YYYYMMDDHHMM` format.
pub fn parse_forecast_time(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y%m%d%H%M").ok()
}
