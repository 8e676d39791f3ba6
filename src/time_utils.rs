// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Medium date with short time, e.g. "Jan 15, 2024 at 10:30 AM".
pub fn format_medium(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %Y at %-I:%M %p").to_string()
}

/// Timestamp used in export file names, e.g. "2024-01-15 10.30.00".
pub fn format_file_stamp(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d %H.%M.%S").to_string()
}

/// Calendar-day label used to bucket activity lists, e.g. "Monday, January 15, 2024".
pub fn format_day_label(date: DateTime<Utc>) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// Compact elapsed time: "45:07" below an hour, "1:02:03" above.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_formats() {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 14, 5, 9).unwrap();
        assert_eq!(format_utc_rfc3339(date), "2024-01-15T14:05:09Z");
        assert_eq!(format_medium(date), "Jan 15, 2024 at 2:05 PM");
        assert_eq!(format_file_stamp(date), "2024-01-15 14.05.09");
        assert_eq!(format_day_label(date), "Monday, January 15, 2024");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::seconds(2707)), "45:07");
        assert_eq!(format_duration(Duration::seconds(3723)), "1:02:03");
        assert_eq!(format_duration(Duration::seconds(-5)), "0:00");
    }
}
