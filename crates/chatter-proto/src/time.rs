//! Wire timestamp format.
//!
//! Timestamps on the wire carry minute precision and no zone annotation;
//! chatterd formats them in UTC.

use chrono::DateTime;

/// `strftime` pattern of every timestamp on the wire.
pub const WIRE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Format a unix timestamp (seconds, UTC) for the wire.
pub fn format_wire_time(unix_secs: i64) -> String {
    DateTime::from_timestamp(unix_secs, 0)
        .map(|dt| dt.format(WIRE_TIME_FORMAT).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minute_precision_utc() {
        // 2026-08-01 10:15:42 UTC
        assert_eq!(format_wire_time(1_785_579_342), "2026-08-01 10:15");
    }

    #[test]
    fn seconds_are_truncated_not_rounded() {
        assert_eq!(format_wire_time(1_785_579_359), "2026-08-01 10:15");
    }
}
