//! Date conversion between the extract and report formats.
//!
//! The database delivers ISO 8601 dates (`YYYY-MM-DD`, sometimes followed by
//! a time part); report documents expect `DD.MM.YYYY`.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?<year>[0-9]{4})-(?<month>[0-9]{2})-(?<day>[0-9]{2})").expect("date pattern compiles")
});

/// Report date format.
pub const REPORT_DATE_FORMAT: &str = "%d.%m.%Y";

/// Parse the first `YYYY-MM-DD` date found in `value`.
///
/// Returns `None` when there is no such date or it does not exist in the
/// calendar.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let caps = ISO_DATE.captures(value)?;
    let year = caps["year"].parse().ok()?;
    let month = caps["month"].parse().ok()?;
    let day = caps["day"].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Convert an extract date to the report format.
pub fn to_report_date(value: &str) -> Option<String> {
    parse_iso_date(value).map(|date| date.format(REPORT_DATE_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_plain_dates() {
        assert_eq!(to_report_date("2024-07-01").as_deref(), Some("01.07.2024"));
        assert_eq!(to_report_date("1999-12-31").as_deref(), Some("31.12.1999"));
    }

    #[test]
    fn tolerates_time_part() {
        assert_eq!(
            to_report_date("2023-07-01 00:00:00.0").as_deref(),
            Some("01.07.2023")
        );
    }

    #[test]
    fn rejects_other_formats() {
        assert_eq!(to_report_date(""), None);
        assert_eq!(to_report_date("01.07.2024"), None);
        assert_eq!(to_report_date("2024-7-1"), None);
        assert_eq!(to_report_date("2024-13-01"), None);
        assert_eq!(to_report_date("2023-02-29"), None);
    }
}
