//! Calendar date parsing

use chrono::NaiveDate;

/// Parse a `YYYY-MM-DD` string into a calendar date.
///
/// The date is built from explicit year/month/day integers, never from a
/// timestamp, so the same string maps to the same day in every server time
/// zone. Returns `None` for anything malformed, including impossible dates
/// such as `2024-02-30`.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.trim().splitn(3, '-');
    let year = parse_component(parts.next()?, 4)?;
    let month = parse_component(parts.next()?, 2)?;
    let day = parse_component(parts.next()?, 2)?;

    NaiveDate::from_ymd_opt(year as i32, month, day)
}

fn parse_component(part: &str, width: usize) -> Option<u32> {
    if part.len() != width || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}
