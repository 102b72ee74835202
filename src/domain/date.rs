//! Date parsing and calendar-month window computation.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse an arbitrary date string into a UTC timestamp.
///
/// Accepts RFC 3339 / ISO 8601 (with or without time and offset), RFC 2822,
/// slash-separated dates, and common long-form date strings. Returns `None`
/// for empty or unparseable input; callers branch on the invalid case
/// explicitly instead of catching an error.
pub fn parse_flexible_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Some(dt.with_timezone(&Utc));
    }

    const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
    for fmt in DATETIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(input, fmt) {
            return Some(ndt.and_utc());
        }
    }

    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];
    for fmt in DATE_FORMATS {
        if let Ok(nd) = NaiveDate::parse_from_str(input, fmt) {
            return Some(nd.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }

    None
}

/// Extract `(year, month)` from a month label such as `2024年1月`.
///
/// The label must contain exactly two embedded integer groups and the second
/// must be a calendar month (1-12). Returns `None` otherwise.
pub fn parse_month_label(label: &str) -> Option<(i32, u32)> {
    let mut groups: Vec<String> = Vec::new();
    let mut current = String::new();
    for c in label.chars() {
        if c.is_ascii_digit() {
            current.push(c);
        } else if !current.is_empty() {
            groups.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }

    if groups.len() != 2 {
        return None;
    }

    let year: i32 = groups[0].parse().ok()?;
    let month: u32 = groups[1].parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }

    Some((year, month))
}

/// Inclusive window covering one calendar month: first day 00:00:00.000
/// through last day 23:59:59.999, with correct month lengths and leap years.
pub fn month_range(year: i32, month: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let last = next_first.pred_opt()?;

    let start = first.and_hms_opt(0, 0, 0)?.and_utc();
    let end = last.and_hms_milli_opt(23, 59, 59, 999)?.and_utc();
    Some((start, end))
}
