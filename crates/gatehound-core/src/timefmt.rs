use chrono::{DateTime, FixedOffset};

/// Display timezone for stored timestamps (UTC+7).
const DISPLAY_OFFSET_SECS: i32 = 7 * 3600;

/// Rewrite an RFC 3339 timestamp into the display form used by the stored
/// event log: full weekday name plus wall time in UTC+7. A string that does
/// not parse is returned unchanged rather than rejected.
pub fn format_display_timestamp(iso: &str) -> String {
    let Some(offset) = FixedOffset::east_opt(DISPLAY_OFFSET_SECS) else {
        return iso.to_string();
    };
    match DateTime::parse_from_rfc3339(iso) {
        Ok(parsed) => parsed.with_timezone(&offset).format("%A %H:%M:%S").to_string(),
        Err(_) => iso.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_utc_to_display_offset() {
        // 2026-08-28 is a Friday; 18:30 UTC is 01:30 Saturday in UTC+7.
        assert_eq!(
            format_display_timestamp("2026-08-28T18:30:00Z"),
            "Saturday 01:30:00"
        );
        assert_eq!(
            format_display_timestamp("2026-08-28T03:00:00Z"),
            "Friday 10:00:00"
        );
    }

    #[test]
    fn honors_an_existing_offset() {
        assert_eq!(
            format_display_timestamp("2026-08-28T10:00:00+07:00"),
            "Friday 10:00:00"
        );
    }

    #[test]
    fn unparseable_input_passes_through() {
        assert_eq!(format_display_timestamp("not-a-timestamp"), "not-a-timestamp");
        assert_eq!(format_display_timestamp(""), "");
    }
}
