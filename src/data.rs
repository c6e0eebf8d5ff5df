//! Lenient date parsing and bucketing for loosely formatted spreadsheet cells.
//!
//! Task spreadsheets arrive with whatever date style the source system used,
//! so parsing tries a fixed format list in order and reports failure as
//! `None` instead of an error. Downstream derivations treat `None` as an
//! absent date and degrade to documented defaults.

use chrono::NaiveDate;

/// Formats tried in order when interpreting a cell as a date. Day-first
/// formats precede month-first ones because the source spreadsheets are
/// predominantly Brazilian.
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];

/// Datetime formats accepted by truncation to their date component. Exported
/// spreadsheets often render date cells with a midnight time attached.
pub const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Best-effort date parse. Trims the cell, tries [`DATE_FORMATS`] then
/// [`DATETIME_FORMATS`], and returns `None` for blank or unparsable input.
pub fn parse_date_lenient(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(parsed);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = chrono::NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(parsed.date());
        }
    }
    None
}

/// Year-month bucket (`YYYY-MM`) for monthly roll-ups.
pub fn month_bucket(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_lenient_supports_multiple_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        assert_eq!(parse_date_lenient("2024-05-06"), Some(expected));
        assert_eq!(parse_date_lenient("06/05/2024"), Some(expected));
        assert_eq!(parse_date_lenient("2024/05/06"), Some(expected));
        assert_eq!(parse_date_lenient(" 2024-05-06 "), Some(expected));
    }

    #[test]
    fn parse_date_lenient_truncates_datetimes() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        assert_eq!(parse_date_lenient("2024-05-06 00:00:00"), Some(expected));
        assert_eq!(parse_date_lenient("2024-05-06T14:30:00"), Some(expected));
    }

    #[test]
    fn parse_date_lenient_returns_none_instead_of_failing() {
        assert_eq!(parse_date_lenient(""), None);
        assert_eq!(parse_date_lenient("   "), None);
        assert_eq!(parse_date_lenient("amanhã"), None);
        assert_eq!(parse_date_lenient("2024-13-40"), None);
    }

    #[test]
    fn month_bucket_zero_pads() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(month_bucket(date), "2024-01");
    }
}
