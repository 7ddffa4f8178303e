//! Statement date parsing.

use chrono::{Datelike, NaiveDate};

use crate::error::{Error, Result};

/// Formats carrying their own year, tried in order.
const DATED_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Leap year used to read month and day of a yearless date.
const PLACEHOLDER_YEAR: i32 = 2000;

/// Parse a date that carries its own year: `01/31/2020`, `01/31/20`,
/// `2020-01-31`, `Jan 31, 2020`, `31 Jan 2020`.
pub fn parse_full_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let parts: Vec<&str> = text.split('/').collect();
    if parts.len() == 3 {
        // chrono reads "20" under %Y as the year 20
        let format = if parts[2].len() <= 2 { "%m/%d/%y" } else { "%m/%d/%Y" };
        return NaiveDate::parse_from_str(text, format).ok();
    }
    DATED_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

/// Month and day of a yearless date: `01/31` or `Jan 31`.
fn parse_month_day(text: &str) -> Option<(u32, u32)> {
    let text = text.trim();
    if let Some((month, day)) = text.split_once('/') {
        let month = month.trim().parse().ok()?;
        let day = day.trim().parse().ok()?;
        return Some((month, day));
    }
    let padded = format!("{text} {PLACEHOLDER_YEAR}");
    ["%b %d %Y", "%B %d %Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&padded, format).ok())
        .map(|date| (date.month(), date.day()))
}

/// Parse an activity line date.
///
/// Full dates are taken as printed. A yearless `MM/DD` date takes the year
/// of `period_end`, or the year before when that would place it after the
/// period end (a December line on a January statement). Without a period
/// end, `fallback_year` is used.
pub fn parse_statement_date(
    text: &str,
    period_end: Option<NaiveDate>,
    fallback_year: Option<i32>,
) -> Result<NaiveDate> {
    if let Some(date) = parse_full_date(text) {
        return Ok(date);
    }

    let (month, day) =
        parse_month_day(text).ok_or_else(|| Error::InvalidDate(text.to_string()))?;

    let date = match period_end {
        Some(end) => NaiveDate::from_ymd_opt(end.year(), month, day)
            .filter(|date| *date <= end)
            .or_else(|| NaiveDate::from_ymd_opt(end.year() - 1, month, day)),
        None => {
            let year = fallback_year.ok_or_else(|| {
                Error::InvalidDate(format!("{text} (no year and no statement period)"))
            })?;
            NaiveDate::from_ymd_opt(year, month, day)
        }
    };
    date.ok_or_else(|| Error::InvalidDate(text.to_string()))
}
