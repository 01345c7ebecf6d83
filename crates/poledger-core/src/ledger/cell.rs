//! Ledger cell values and the `N/A` sentinel.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Text written for a value that could not be extracted or supplied.
pub const SENTINEL: &str = "N/A";

/// A single ledger cell.
///
/// `Missing` is the typed form of the sentinel: it always renders as `N/A`
/// and `N/A` always reads back as `Missing`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cell {
    /// Nothing stored in the source file.
    #[default]
    Empty,
    /// The `N/A` sentinel.
    Missing,
    Int(i64),
    Decimal(Decimal),
    Text(String),
    /// Workbook date or date-time.
    Date(NaiveDateTime),
    /// Workbook formula, stored without the leading `=`.
    Formula(String),
}

impl Cell {
    /// Parse a textual cell as read from CSV.
    ///
    /// Integers with leading zeros stay text so identifiers like `00123`
    /// survive a round trip.
    pub fn parse(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if raw.is_empty() {
            return Cell::Empty;
        }
        if trimmed == SENTINEL {
            return Cell::Missing;
        }

        let unsigned = trimmed.strip_prefix('-').unwrap_or(trimmed);
        let leading_zero =
            unsigned.len() > 1 && unsigned.starts_with('0') && !unsigned.starts_with("0.");
        if !leading_zero && trimmed == raw {
            if let Ok(i) = trimmed.parse::<i64>() {
                return Cell::Int(i);
            }
            if looks_decimal(trimmed) {
                if let Ok(d) = Decimal::from_str(trimmed) {
                    return Cell::Decimal(d);
                }
            }
        }

        Cell::Text(raw.to_string())
    }

    /// Convert a float read from a workbook, keeping integral values integral.
    pub fn from_f64(f: f64) -> Cell {
        if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
            return Cell::Int(f as i64);
        }
        // String round trip avoids binary artifacts such as 0.0035 -> 0.00349999...
        format!("{f}")
            .parse::<Decimal>()
            .ok()
            .or_else(|| Decimal::try_from(f).ok())
            .map(Cell::Decimal)
            .unwrap_or_else(|| Cell::Text(f.to_string()))
    }

    /// True for the sentinel.
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// True when the cell holds neither data nor the sentinel.
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Interpret the cell as a purchase-order key.
    pub fn as_key(&self) -> Option<u64> {
        match self {
            Cell::Int(i) => u64::try_from(*i).ok(),
            Cell::Decimal(d) if d.fract().is_zero() => d.to_u64(),
            Cell::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Cell::Int(i) => Some(*i),
            Cell::Decimal(d) if d.fract().is_zero() => d.to_i64(),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Cell::Int(i) => Some(Decimal::from(*i)),
            Cell::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Text(s) if !s.trim().is_empty() => Some(s.clone()),
            Cell::Int(i) => Some(i.to_string()),
            Cell::Decimal(d) => Some(d.to_string()),
            Cell::Date(_) => Some(self.to_string()),
            _ => None,
        }
    }

    /// Numeric value for spreadsheet output.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Decimal(d) => d.to_f64(),
            _ => None,
        }
    }
}

fn looks_decimal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let mut parts = digits.splitn(2, '.');
    let int_part = parts.next().unwrap_or("");
    let frac_part = parts.next().unwrap_or("");
    !int_part.is_empty()
        && !frac_part.is_empty()
        && int_part.chars().all(|c| c.is_ascii_digit())
        && frac_part.chars().all(|c| c.is_ascii_digit())
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Missing => f.write_str(SENTINEL),
            Cell::Int(i) => write!(f, "{i}"),
            Cell::Decimal(d) => write!(f, "{d}"),
            Cell::Text(s) => f.write_str(s),
            Cell::Date(dt) if dt.time() == NaiveTime::MIN => write!(f, "{}", dt.format("%m/%d/%Y")),
            Cell::Date(dt) => write!(f, "{}", dt.format("%m/%d/%Y %H:%M:%S")),
            Cell::Formula(formula) => write!(f, "={formula}"),
        }
    }
}

impl From<Option<i64>> for Cell {
    fn from(value: Option<i64>) -> Self {
        value.map(Cell::Int).unwrap_or(Cell::Missing)
    }
}

impl From<Option<Decimal>> for Cell {
    fn from(value: Option<Decimal>) -> Self {
        value.map(Cell::Decimal).unwrap_or(Cell::Missing)
    }
}

impl From<Option<String>> for Cell {
    fn from(value: Option<String>) -> Self {
        value.map(Cell::Text).unwrap_or(Cell::Missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_cells() {
        assert_eq!(Cell::parse(""), Cell::Empty);
        assert_eq!(Cell::parse("N/A"), Cell::Missing);
        assert_eq!(Cell::parse("123456"), Cell::Int(123456));
        assert_eq!(
            Cell::parse("4500.00"),
            Cell::Decimal(Decimal::from_str("4500.00").unwrap())
        );
        assert_eq!(Cell::parse("00123"), Cell::Text("00123".to_string()));
        assert_eq!(Cell::parse("0"), Cell::Int(0));
        assert_eq!(Cell::parse("09/15/2024"), Cell::Text("09/15/2024".to_string()));
        assert_eq!(Cell::parse(" 12"), Cell::Text(" 12".to_string()));
    }

    #[test]
    fn test_sentinel_round_trip() {
        assert_eq!(Cell::parse(&Cell::Missing.to_string()), Cell::Missing);
        assert_eq!(Cell::Empty.to_string(), "");
    }

    #[test]
    fn test_decimal_keeps_scale_in_display() {
        let cell = Cell::parse("4500.00");
        assert_eq!(cell.to_string(), "4500.00");
    }

    #[test]
    fn test_from_f64() {
        assert_eq!(Cell::from_f64(123456.0), Cell::Int(123456));
        assert_eq!(
            Cell::from_f64(0.0035),
            Cell::Decimal(Decimal::from_str("0.0035").unwrap())
        );
    }

    #[test]
    fn test_as_key() {
        assert_eq!(Cell::Int(42).as_key(), Some(42));
        assert_eq!(Cell::Text(" 42 ".to_string()).as_key(), Some(42));
        assert_eq!(Cell::Decimal(Decimal::from(42)).as_key(), Some(42));
        assert_eq!(Cell::Int(-1).as_key(), None);
        assert_eq!(Cell::Missing.as_key(), None);
        assert_eq!(Cell::Formula("A1".to_string()).as_key(), None);
    }

    #[test]
    fn test_display_workbook_cells() {
        let day = chrono::NaiveDate::from_ymd_opt(2024, 9, 15).unwrap();
        assert_eq!(Cell::Date(day.and_hms_opt(0, 0, 0).unwrap()).to_string(), "09/15/2024");
        assert_eq!(
            Cell::Date(day.and_hms_opt(13, 5, 0).unwrap()).to_string(),
            "09/15/2024 13:05:00"
        );
        assert_eq!(Cell::Formula("SUM(B2:B9)".to_string()).to_string(), "=SUM(B2:B9)");
    }
}
