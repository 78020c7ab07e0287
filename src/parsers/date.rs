//! Observation dates and date intervals.
//!
//! A plate exposed over midnight is logged as an interval such as
//! `31.12.65-01.01.66` or `12-13.04.76`. The start of the interval is the
//! evening the observation began and is the only date returned; components
//! missing from the start are taken from the fully written end.

use super::{GrammarRule, group_u32, parse_with};
use crate::error::{PlateError, Result};
use crate::models::{FieldKind, ParsedDate};
use regex::Captures;
use std::sync::LazyLock;

/// Day with optional month and year, as written on either side of an interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PartialDate {
    day: u32,
    month: Option<u32>,
    year: Option<i32>,
}

impl PartialDate {
    fn complete(self) -> Option<ParsedDate> {
        ParsedDate::new(self.day, self.month?, self.year?)
    }
}

/// Expand a two digit year into the 1900s; four digit years are kept
fn expand_year(captures: &Captures<'_>) -> std::result::Result<Option<i32>, String> {
    match captures.name("year") {
        Some(m) => {
            let digits = m.as_str();
            let value = digits
                .parse::<i32>()
                .map_err(|e| format!("bad year '{}': {}", digits, e))?;
            match digits.len() {
                2 => Ok(Some(1900 + value)),
                4 => Ok(Some(value)),
                n => Err(format!("year '{}' has {} digits", digits, n)),
            }
        }
        None => Ok(None),
    }
}

fn partial(captures: &Captures<'_>) -> std::result::Result<PartialDate, String> {
    Ok(PartialDate {
        day: group_u32(captures, "day")?.unwrap_or(0),
        month: group_u32(captures, "month")?,
        year: expand_year(captures)?,
    })
}

const FULL_DATE: &str = r"^(?P<day>\d{1,2})\.(?P<month>\d{1,2})\.(?P<year>\d+)$";

static DATE_RULES: LazyLock<Vec<GrammarRule<PartialDate>>> =
    LazyLock::new(|| vec![GrammarRule::new("day.month.year", FULL_DATE, partial)]);

/// Ways the start of an interval may be abbreviated; a trailing dot is tolerated
static START_RULES: LazyLock<Vec<GrammarRule<PartialDate>>> = LazyLock::new(|| {
    vec![
        GrammarRule::new("day", r"^(?P<day>\d{1,2})\.?$", partial),
        GrammarRule::new(
            "day.month",
            r"^(?P<day>\d{1,2})\.(?P<month>\d{1,2})\.?$",
            partial,
        ),
        GrammarRule::new("day.month.year", FULL_DATE, partial),
    ]
});

fn parse_single(text: &str) -> Result<ParsedDate> {
    let value = parse_with(&DATE_RULES, FieldKind::Date, text)?;
    value
        .complete()
        .ok_or_else(|| PlateError::format(FieldKind::Date, text, "no such calendar date"))
}

fn parse_interval(text: &str, first: &str, second: &str) -> Result<ParsedDate> {
    let interval_error = |reason: &str| {
        PlateError::format(
            FieldKind::Date,
            text,
            format!(
                "interval start '{}' and end '{}': {}",
                first.trim(),
                second.trim(),
                reason
            ),
        )
    };

    if first.trim().is_empty() {
        return Err(interval_error("interval has no start"));
    }
    if second.contains('-') {
        return Err(interval_error("more than one hyphen is ambiguous"));
    }

    let end = parse_single(second)
        .map_err(|_| interval_error("end is not a full day.month.year date"))?;
    let start = parse_with(&START_RULES, FieldKind::Date, first)
        .map_err(|_| interval_error("start cannot be completed from the end"))?;

    let completed = PartialDate {
        day: start.day,
        month: start.month.or(Some(end.month())),
        year: start.year.or(Some(end.year())),
    };
    let start_date = completed
        .complete()
        .ok_or_else(|| interval_error("start is not a calendar date"))?;

    if start_date > end {
        return Err(interval_error("start falls after end"));
    }

    Ok(start_date)
}

/// Parse a date such as `13.04.76` or an interval such as `31.12.1965-01.01.66`
///
/// Intervals are split on the first hyphen and resolve to their start date.
pub fn parse_date_item(text: &str) -> Result<ParsedDate> {
    match text.split_once('-') {
        Some((first, second)) => parse_interval(text, first, second),
        None => parse_single(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(text: &str) -> String {
        parse_date_item(text).unwrap().to_string()
    }

    fn assert_format_error(text: &str) {
        match parse_date_item(text) {
            Err(PlateError::Format { kind, text: t, .. }) => {
                assert_eq!(kind, FieldKind::Date);
                assert_eq!(t, text);
            }
            other => panic!("Expected Format error for '{}', got {:?}", text, other),
        }
    }

    #[test]
    fn test_two_digit_year_expands() {
        assert_eq!(date("13.04.76"), "13.04.1976");
    }

    #[test]
    fn test_four_digit_year_kept() {
        assert_eq!(date("13.04.1976"), "13.04.1976");
        assert_eq!(date("3.4.2001"), "03.04.2001");
    }

    #[test]
    fn test_year_range_mixed_widths() {
        assert_eq!(date("31.12.1965-01.01.66"), "31.12.1965");
        assert_eq!(date("31.12.65-01.01.66"), "31.12.1965");
        assert_eq!(date("31.12.65-01.01.1966"), "31.12.1965");
    }

    #[test]
    fn test_day_range_inherits_month_and_year() {
        assert_eq!(date("12-13.04.76"), "12.04.1976");
        assert_eq!(date("12.-13.04.76"), "12.04.1976");
    }

    #[test]
    fn test_month_range_inherits_year() {
        assert_eq!(date("30.04-01.05.76"), "30.04.1976");
        assert_eq!(date("30.04.-01.05.76"), "30.04.1976");
    }

    #[test]
    fn test_spaces_around_hyphen() {
        assert_eq!(date("12 - 13.04.76"), "12.04.1976");
    }

    #[test]
    fn test_invalid_calendar_dates_fail() {
        assert_format_error("31.02.76");
        assert_format_error("13.13.76");
        assert_format_error("31-01.04.76");
    }

    #[test]
    fn test_bad_year_width_fails() {
        assert_format_error("13.04.976");
        assert_format_error("13.04.7");
    }

    #[test]
    fn test_incomplete_single_date_fails() {
        assert_format_error("13.04");
        assert_format_error("");
        assert_format_error("April 1976");
    }

    #[test]
    fn test_interval_end_must_be_full() {
        assert_format_error("12-13.04");
        assert_format_error("12-13");
    }

    #[test]
    fn test_interval_start_with_too_many_components() {
        assert_format_error("01.02.03.04-05.06.76");
    }

    #[test]
    fn test_multiple_hyphens_are_flagged() {
        assert_format_error("-12.04.76");
        assert_format_error("11-12-13.04.76");
    }

    #[test]
    fn test_start_after_end_is_rejected() {
        // completing 31.12 with the end year would land after the end date
        assert_format_error("31.12-01.01.66");
        assert_format_error("14-13.04.76");
    }
}
