//! Date normalization and age derivation.
//!
//! DE-SynPUF encodes every date as an 8-digit `YYYYMMDD` value rendered as
//! text. Parsing is explicit and field-wise: a value that is not a valid
//! calendar date (say, a `00` day component) is rejected here rather than
//! left to an engine's string-to-date coercion.

use std::path::Path;

use chrono::{Datelike, NaiveDate};

use crate::error::{Error, Result};

/// Parse an 8-digit `YYYYMMDD` value into a date. `None` for anything that
/// is not exactly eight digits or does not name a real calendar day.
pub fn parse_compact_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = s[0..4].parse().ok()?;
    let month: u32 = s[4..6].parse().ok()?;
    let day: u32 = s[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse a mandatory date field. A missing or unparseable value fails the
/// file it came from.
pub(crate) fn parse_required(
    file: &Path,
    column: &'static str,
    raw: Option<&str>,
) -> Result<NaiveDate> {
    let value = raw.unwrap_or_default();
    parse_compact_date(value).ok_or_else(|| Error::MalformedDate {
        file: file.to_path_buf(),
        column,
        value: value.to_string(),
    })
}

/// Parse an optional date field. Absent means `None`; present but
/// unparseable fails the file.
pub(crate) fn parse_optional(
    file: &Path,
    column: &'static str,
    raw: Option<&str>,
) -> Result<Option<NaiveDate>> {
    match raw {
        None => Ok(None),
        Some(value) => parse_required(file, column, Some(value)).map(Some),
    }
}

/// Whole calendar years between `birth` and `reference`, adjusted for a
/// birthday not yet reached in the reference year.
pub fn age_in_years(birth: NaiveDate, reference: NaiveDate) -> i32 {
    let mut years = reference.year() - birth.year();
    if reference.month() < birth.month()
        || (reference.month() == birth.month() && reference.day() < birth.day())
    {
        years -= 1;
    }
    years
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_compact_dates() {
        assert_eq!(
            parse_compact_date("19230501"),
            NaiveDate::from_ymd_opt(1923, 5, 1)
        );
        assert_eq!(
            parse_compact_date(" 20080229 "),
            NaiveDate::from_ymd_opt(2008, 2, 29)
        );
    }

    #[test]
    fn rejects_impossible_calendar_days() {
        assert_eq!(parse_compact_date("20080100"), None); // day 00
        assert_eq!(parse_compact_date("20081301"), None); // month 13
        assert_eq!(parse_compact_date("20090229"), None); // not a leap year
    }

    #[test]
    fn rejects_wrong_shapes() {
        assert_eq!(parse_compact_date(""), None);
        assert_eq!(parse_compact_date("2008051"), None);
        assert_eq!(parse_compact_date("200805011"), None);
        assert_eq!(parse_compact_date("2008-05-1"), None);
    }

    #[test]
    fn age_adjusts_for_unreached_birthday() {
        let birth = NaiveDate::from_ymd_opt(1940, 6, 15).unwrap();
        let before = NaiveDate::from_ymd_opt(2008, 6, 14).unwrap();
        let on = NaiveDate::from_ymd_opt(2008, 6, 15).unwrap();
        let after = NaiveDate::from_ymd_opt(2008, 6, 16).unwrap();
        assert_eq!(age_in_years(birth, before), 67);
        assert_eq!(age_in_years(birth, on), 68);
        assert_eq!(age_in_years(birth, after), 68);
    }
}
