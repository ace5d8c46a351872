use time::{
    format_description::well_known::Rfc3339, macros::format_description, OffsetDateTime,
    PrimitiveDateTime,
};

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

/// Submission date column format used by the results CSV export.
pub(crate) fn format_mdy_hm(value: PrimitiveDateTime) -> String {
    let format = format_description!("[month]/[day]/[year] [hour]:[minute]");
    value.format(&format).unwrap_or_else(|_| value.assume_utc().to_string())
}

/// Date format used by per-attempt result rows.
pub(crate) fn format_mdy(value: PrimitiveDateTime) -> String {
    let format = format_description!("[month]/[day]/[year]");
    value.format(&format).unwrap_or_else(|_| value.assume_utc().to_string())
}

/// Elapsed time between start and completion in whole minutes, truncated.
pub(crate) fn elapsed_whole_minutes(
    started_at: PrimitiveDateTime,
    completed_at: PrimitiveDateTime,
) -> i64 {
    (completed_at - started_at).whole_minutes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Month, Time};

    fn stamp(hour: u8, minute: u8, second: u8) -> PrimitiveDateTime {
        let date = Date::from_calendar_date(2025, Month::January, 2).unwrap();
        PrimitiveDateTime::new(date, Time::from_hms(hour, minute, second).unwrap())
    }

    #[test]
    fn format_primitive_outputs_utc_z() {
        assert_eq!(format_primitive(stamp(10, 20, 30)), "2025-01-02T10:20:30Z");
    }

    #[test]
    fn format_mdy_hm_zero_pads() {
        assert_eq!(format_mdy_hm(stamp(9, 5, 0)), "01/02/2025 09:05");
    }

    #[test]
    fn format_mdy_matches_result_rows() {
        assert_eq!(format_mdy(stamp(9, 5, 0)), "01/02/2025");
    }

    #[test]
    fn elapsed_minutes_truncates() {
        // 22 minutes 59 seconds still counts as 22 whole minutes.
        assert_eq!(elapsed_whole_minutes(stamp(10, 0, 0), stamp(10, 22, 59)), 22);
        assert_eq!(elapsed_whole_minutes(stamp(10, 0, 0), stamp(10, 0, 59)), 0);
    }
}
