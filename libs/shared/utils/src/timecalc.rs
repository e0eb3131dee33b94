//! Pure time arithmetic shared by the scheduling and booking flows.
//!
//! Every HH:MM parse, range-overlap test and weekday expansion in the
//! workspace goes through here; the call sites hold no time logic of
//! their own.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use thiserror::Error;

use shared_models::domain::DayOfWeek;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    #[error("invalid time format: {0}")]
    InvalidTimeFormat(String),
}

/// Parse a 24h `HH:MM` string into minutes since midnight.
pub fn parse_minutes(hhmm: &str) -> Result<i32, TimeError> {
    let invalid = || TimeError::InvalidTimeFormat(hhmm.to_string());

    let (h, m) = hhmm.split_once(':').ok_or_else(invalid)?;
    if h.len() != 2 || m.len() != 2 {
        return Err(invalid());
    }
    let hours: i32 = h.parse().map_err(|_| invalid())?;
    let minutes: i32 = m.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }
    Ok(hours * 60 + minutes)
}

/// Render minutes since midnight as zero-padded `HH:MM`.
pub fn format_minutes(total: i32) -> String {
    format!("{:02}:{:02}", total / 60, total % 60)
}

pub fn minutes_of(t: NaiveTime) -> i32 {
    (t.hour() * 60 + t.minute()) as i32
}

pub fn time_of_minutes(total: i32) -> NaiveTime {
    NaiveTime::from_hms_opt((total / 60) as u32, (total % 60) as u32, 0)
        .unwrap_or(NaiveTime::MIN)
}

/// Parse `HH:MM` straight into a `NaiveTime`.
pub fn parse_time(hhmm: &str) -> Result<NaiveTime, TimeError> {
    parse_minutes(hhmm).map(time_of_minutes)
}

/// Half-open overlap test: `[s1, e1)` against `[s2, e2)`. Touching edges
/// do not overlap.
pub fn ranges_overlap<T: PartialOrd>(s1: T, e1: T, s2: T, e2: T) -> bool {
    s1 < e2 && s2 < e1
}

/// Combine a calendar date with an `HH:MM` wall-clock time into a UTC
/// timestamp.
pub fn combine(date: NaiveDate, hhmm: &str) -> Result<DateTime<Utc>, TimeError> {
    Ok(combine_time(date, parse_time(hhmm)?))
}

pub fn combine_time(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    date.and_time(time).and_utc()
}

/// Concrete dates for the requested weekdays over the next `weeks_ahead`
/// weeks, starting strictly after `today`. Ascending, no duplicates.
pub fn future_dates_for_weekdays(
    today: NaiveDate,
    weekdays: &[DayOfWeek],
    weeks_ahead: u32,
) -> Vec<NaiveDate> {
    let current = today.weekday().num_days_from_sunday() as i64;

    let mut dates = Vec::new();
    for week in 0..weeks_ahead as i64 {
        for weekday in weekdays {
            let target = weekday.to_chrono().num_days_from_sunday() as i64;
            let days_ahead = (target + 7 - current) % 7 + week * 7;
            let date = today + Duration::days(days_ahead);
            // days_ahead is 0 when the weekday is today's; today itself is
            // never bookable.
            if date > today {
                dates.push(date);
            }
        }
    }
    dates.sort();
    dates.dedup();
    dates
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parses_and_formats_hhmm() {
        assert_eq!(parse_minutes("00:00").unwrap(), 0);
        assert_eq!(parse_minutes("09:30").unwrap(), 570);
        assert_eq!(parse_minutes("23:59").unwrap(), 1439);
        assert_eq!(format_minutes(570), "09:30");
        assert_eq!(format_minutes(0), "00:00");
    }

    #[test]
    fn rejects_malformed_times() {
        for bad in ["9:30", "0930", "24:00", "12:60", "ab:cd", "12:3", ""] {
            assert_matches!(parse_minutes(bad), Err(TimeError::InvalidTimeFormat(_)));
        }
    }

    #[test]
    fn overlap_is_half_open() {
        assert!(ranges_overlap(540, 600, 570, 630));
        assert!(ranges_overlap(540, 600, 550, 560));
        // Touching edges are not an overlap
        assert!(!ranges_overlap(540, 600, 600, 660));
        assert!(!ranges_overlap(600, 660, 540, 600));
        assert!(!ranges_overlap(540, 600, 660, 720));
    }

    #[test]
    fn combines_date_and_time() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let at = combine(date, "09:15").unwrap();
        assert_eq!(at.to_rfc3339(), "2025-06-01T09:15:00+00:00");
        assert_matches!(combine(date, "9:15"), Err(TimeError::InvalidTimeFormat(_)));
    }

    #[test]
    fn weekday_expansion_skips_today_and_sorts() {
        // 2025-06-02 is a Monday
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let dates = future_dates_for_weekdays(today, &[DayOfWeek::Monday, DayOfWeek::Wednesday], 2);

        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2025, 6, 4).unwrap(),
                NaiveDate::from_ymd_opt(2025, 6, 9).unwrap(),
                NaiveDate::from_ymd_opt(2025, 6, 11).unwrap(),
            ]
        );
        // Today itself was skipped, so today's weekday contributes one
        // fewer date than the horizon
        assert_eq!(dates.iter().filter(|d| d.weekday() == chrono::Weekday::Mon).count(), 1);
    }

    #[test]
    fn weekday_expansion_dedups_repeated_weekdays() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let dates = future_dates_for_weekdays(today, &[DayOfWeek::Friday, DayOfWeek::Friday], 1);
        assert_eq!(dates, vec![NaiveDate::from_ymd_opt(2025, 6, 6).unwrap()]);
    }
}
