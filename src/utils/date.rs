//! Publish dates for content documents.
//!
//! Dates are calendar dates without time-of-day. Parsing is strict about the
//! `YYYY-MM-DD` shape before handing the numbers to chrono for validation, so
//! `2024-1-5` is rejected even though chrono's `%m` would accept it.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt::{self, Write};

/// Format used when a date is serialized into a template context.
const ISO_FORMAT: &str = "%Y-%m-%d";

/// A publish date, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublishDate(NaiveDate);

impl PublishDate {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parse from "YYYY-MM-DD". Returns `None` on a wrong shape or an
    /// impossible calendar date.
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
            return None;
        }

        let year = parse_u16(&bytes[0..4])?;
        let month = parse_u8(&bytes[5..7])?;
        let day = parse_u8(&bytes[8..10])?;

        Self::from_ymd(year.into(), month.into(), day.into())
    }

    /// Render with a strftime-style format string.
    ///
    /// Returns `None` when `fmt` contains an unknown specifier.
    pub fn format(&self, fmt: &str) -> Option<String> {
        let mut out = String::new();
        write!(out, "{}", self.0.format(fmt)).ok()?;
        Some(out)
    }
}

impl fmt::Display for PublishDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(ISO_FORMAT))
    }
}

impl Serialize for PublishDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse 2-digit ASCII number
#[inline]
fn parse_u8(bytes: &[u8]) -> Option<u8> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = bytes[0].wrapping_sub(b'0');
    let d2 = bytes[1].wrapping_sub(b'0');
    if d1 > 9 || d2 > 9 {
        return None;
    }
    Some(d1 * 10 + d2)
}

/// Parse 4-digit ASCII number
#[inline]
fn parse_u16(bytes: &[u8]) -> Option<u16> {
    if bytes.len() != 4 {
        return None;
    }
    let mut result = 0u16;
    for &b in bytes {
        let d = b.wrapping_sub(b'0');
        if d > 9 {
            return None;
        }
        result = result * 10 + d as u16;
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let date = PublishDate::parse("2024-06-15").unwrap();
        assert_eq!(date, PublishDate::from_ymd(2024, 6, 15).unwrap());
        assert_eq!(date.to_string(), "2024-06-15");
    }

    #[test]
    fn test_parse_invalid_calendar_date() {
        assert!(PublishDate::parse("2024-13-40").is_none());
        assert!(PublishDate::parse("2024-00-10").is_none());
        assert!(PublishDate::parse("2024-04-31").is_none());
        // Feb 29 only on leap years
        assert!(PublishDate::parse("2024-02-29").is_some());
        assert!(PublishDate::parse("2023-02-29").is_none());
        assert!(PublishDate::parse("1900-02-29").is_none());
    }

    #[test]
    fn test_parse_invalid_shape() {
        assert!(PublishDate::parse("2024-1-05").is_none());
        assert!(PublishDate::parse("2024/01/05").is_none());
        assert!(PublishDate::parse("2024-01-05T10:00:00Z").is_none());
        assert!(PublishDate::parse("yesterday").is_none());
        assert!(PublishDate::parse("").is_none());
    }

    #[test]
    fn test_ordering() {
        let early = PublishDate::parse("2024-01-01").unwrap();
        let late = PublishDate::parse("2024-06-01").unwrap();
        assert!(late > early);
    }

    #[test]
    fn test_format() {
        let date = PublishDate::parse("2024-03-07").unwrap();
        assert_eq!(date.format("%B %-d, %Y").as_deref(), Some("March 7, 2024"));
        assert_eq!(date.format("%d/%m/%y").as_deref(), Some("07/03/24"));
    }

    #[test]
    fn test_format_unknown_specifier() {
        let date = PublishDate::parse("2024-03-07").unwrap();
        assert!(date.format("%Q").is_none());
    }

    #[test]
    fn test_serialize_as_iso_string() {
        let date = PublishDate::parse("2024-03-07").unwrap();
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"2024-03-07\"");
    }
}
