//! Defensive cell parsing
//!
//! None of these fail: anything unparseable becomes `None` (or `false` for
//! flags) and the caller applies its own default.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::schema::normalize_text;

/// Explicit date formats, tried in order before the generic fallback
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y"];

/// Timestamp and alternate layouts accepted by the fallback
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];
const FALLBACK_DATE_FORMATS: [&str; 5] = ["%Y/%m/%d", "%d.%m.%Y", "%Y%m%d", "%d/%m/%y", "%m/%d/%y"];

/// `%Y` accepts 1 to 4 digits, so "01/02/27" would otherwise parse as year 27
fn four_digit_year(date: NaiveDate) -> Option<NaiveDate> {
    (date.year() >= 1000).then_some(date)
}

fn parse_with(s: &str, formats: &[&str]) -> Option<NaiveDate> {
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok().and_then(four_digit_year))
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    parse_with(s, &DATE_FORMATS).or_else(|| parse_date_generic(s))
}

fn parse_date_generic(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| parse_with(s, &FALLBACK_DATE_FORMATS))
}

/// Plain or scientific decimal notation ("1000", "12.5", "1e3")
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// "true"/"1"/"sim" are true; everything else, recognized or not, is false
pub fn parse_bool(raw: &str) -> bool {
    matches!(normalize_text(raw).as_str(), "true" | "1" | "sim")
}

/// A whole, non-negative number of months. "4" and "4.0" both give 4.
pub fn parse_month_count(raw: &str) -> Option<u32> {
    let value = parse_decimal(raw)?;
    if value.is_sign_negative() || !value.fract().is_zero() {
        return None;
    }
    value.to_u32()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_formats() {
        assert_eq!(parse_date("2025-03-04"), Some(ymd(2025, 3, 4)));
        assert_eq!(parse_date("31/12/2025"), Some(ymd(2025, 12, 31)));
        assert_eq!(parse_date("28-02-2026"), Some(ymd(2026, 2, 28)));
        assert_eq!(parse_date(" 2025-03-04 "), Some(ymd(2025, 3, 4)));
    }

    #[test]
    fn test_day_first_wins_when_ambiguous() {
        // 03/04 is read as 3 April, not March 4
        assert_eq!(parse_date("03/04/2025"), Some(ymd(2025, 4, 3)));
        // Only valid month-first
        assert_eq!(parse_date("12/31/2025"), Some(ymd(2025, 12, 31)));
    }

    #[test]
    fn test_generic_fallback() {
        assert_eq!(parse_date("2025-03-04 00:00:00"), Some(ymd(2025, 3, 4)));
        assert_eq!(parse_date("2025-03-04T10:30:00"), Some(ymd(2025, 3, 4)));
        assert_eq!(parse_date("2025-03-04T10:30:00-03:00"), Some(ymd(2025, 3, 4)));
        assert_eq!(parse_date("2025/03/04"), Some(ymd(2025, 3, 4)));
    }

    #[test]
    fn test_two_digit_years() {
        assert_eq!(parse_date("01/02/27"), Some(ymd(2027, 2, 1)));
        assert_eq!(parse_date("5/3/26"), Some(ymd(2026, 3, 5)));
        assert_eq!(parse_date("12/31/27"), Some(ymd(2027, 12, 31)));
        // never a first-century date
        assert_eq!(parse_date("01/02/0027"), None);
    }

    #[test]
    fn test_unparseable_date_is_none() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("sem data"), None);
        assert_eq!(parse_date("31/31/2025"), None);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("1000"), Some(Decimal::new(1000, 0)));
        assert_eq!(parse_decimal(" 12.50 "), Some(Decimal::new(1250, 2)));
        assert_eq!(parse_decimal("1e3"), Some(Decimal::new(1000, 0)));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal("1.234,56"), None);
    }

    #[test]
    fn test_parse_bool() {
        for raw in ["true", "TRUE", " 1 ", "sim", "Sim"] {
            assert!(parse_bool(raw), "{raw} should be true");
        }
        for raw in ["false", "0", "nao", "Não", "", "talvez", "yes"] {
            assert!(!parse_bool(raw), "{raw} should be false");
        }
    }

    #[test]
    fn test_parse_month_count() {
        assert_eq!(parse_month_count("4"), Some(4));
        assert_eq!(parse_month_count("4.0"), Some(4));
        assert_eq!(parse_month_count("0"), Some(0));
        assert_eq!(parse_month_count("-1"), None);
        assert_eq!(parse_month_count("2.5"), None);
        assert_eq!(parse_month_count(""), None);
    }
}
