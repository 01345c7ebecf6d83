//! Ship date checks.

use chrono::NaiveDate;

/// Parse a printed ship date such as "09/15/2024" or "9/15/24".
pub fn parse_ship_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let year = s.rsplit('/').next()?;
    let format = match year.len() {
        2 => "%m/%d/%y",
        4 => "%m/%d/%Y",
        _ => return None,
    };
    NaiveDate::parse_from_str(s, format).ok()
}
