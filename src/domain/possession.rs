// src/domain/possession.rs

use chrono::NaiveDate;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Parses `"<Mon> <YYYY>"` (e.g. `"Dec 2027"`) to the first day of that month.
/// Month tokens are matched case-insensitively against the three-letter table.
pub fn parse_possession(raw: &str) -> Option<NaiveDate> {
    let mut tokens = raw.split_whitespace();
    let month_token = tokens.next()?;
    let year_token = tokens.next()?;
    if tokens.next().is_some() {
        return None;
    }

    let month = MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(month_token))? as u32
        + 1;

    if year_token.len() != 4 || !year_token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let year: i32 = year_token.parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, 1)
}
