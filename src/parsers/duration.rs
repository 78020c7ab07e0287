//! Exposure durations and clock readings.
//!
//! Both grammars share their pattern text but not their defaulting rules:
//! a duration must always carry an explicit unit, while a clock reading
//! accepts a bare integer as whole hours. The two rule tables are kept
//! separate so neither policy leaks into the other.

use super::{GrammarRule, NUMBER, group_f64, parse_with};
use crate::error::{PlateError, Result};
use crate::models::{ClockTime, FieldKind};
use regex::Captures;
use std::sync::LazyLock;

const SECONDS_PER_DAY: u32 = 24 * 3600;

/// Hour, minute and second components, any of which may be fractional
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Hms {
    hours: f64,
    minutes: f64,
    seconds: f64,
}

impl Hms {
    fn total_seconds(&self) -> f64 {
        self.hours * 3600.0 + self.minutes * 60.0 + self.seconds
    }
}

fn pure_hours_pattern() -> String {
    // "12.h5" reads the digits after the embedded h as a fraction of the hour
    format!(r"^(?:(?P<h>{NUMBER})h|(?P<hi>\d+)\.h(?P<frac>\d+))$")
}

fn hours_minutes_pattern() -> String {
    format!(r"^(?P<h>\d+)h(?P<m>{NUMBER})m?$")
}

fn hms_pattern() -> String {
    format!(r"^(?:(?P<h>{NUMBER})h)?(?:(?P<m>{NUMBER})m)?(?:(?P<s>{NUMBER})(?P<unit>s)?)?$")
}

fn pure_hours(captures: &Captures<'_>) -> std::result::Result<Hms, String> {
    let hours = match (captures.name("hi"), captures.name("frac")) {
        (Some(whole), Some(frac)) => format!("{}.{}", whole.as_str(), frac.as_str())
            .parse::<f64>()
            .map_err(|e| format!("bad hours '{}': {}", whole.as_str(), e))?,
        _ => group_f64(captures, "h")?.unwrap_or(0.0),
    };
    Ok(Hms {
        hours,
        ..Hms::default()
    })
}

fn hours_minutes(captures: &Captures<'_>) -> std::result::Result<Hms, String> {
    Ok(Hms {
        hours: group_f64(captures, "h")?.unwrap_or(0.0),
        minutes: group_f64(captures, "m")?.unwrap_or(0.0),
        seconds: 0.0,
    })
}

fn hms(captures: &Captures<'_>) -> std::result::Result<Hms, String> {
    let hours = group_f64(captures, "h")?;
    let minutes = group_f64(captures, "m")?;
    let seconds = group_f64(captures, "s")?;

    if hours.is_none() && minutes.is_none() && seconds.is_none() {
        return Err("no hours, minutes or seconds given".to_string());
    }
    // The seconds suffix may only be dropped after an explicit minutes component
    if seconds.is_some() && captures.name("unit").is_none() && minutes.is_none() {
        return Err("number without a unit".to_string());
    }

    Ok(Hms {
        hours: hours.unwrap_or(0.0),
        minutes: minutes.unwrap_or(0.0),
        seconds: seconds.unwrap_or(0.0),
    })
}

fn bare_hours(captures: &Captures<'_>) -> std::result::Result<Hms, String> {
    Ok(Hms {
        hours: group_f64(captures, "h")?.unwrap_or(0.0),
        ..Hms::default()
    })
}

static DURATION_RULES: LazyLock<Vec<GrammarRule<Hms>>> = LazyLock::new(|| {
    vec![
        GrammarRule::new("pure hours", &pure_hours_pattern(), pure_hours),
        GrammarRule::new("hours and minutes", &hours_minutes_pattern(), hours_minutes),
        GrammarRule::new("hours, minutes and seconds", &hms_pattern(), hms),
    ]
});

static CLOCK_RULES: LazyLock<Vec<GrammarRule<Hms>>> = LazyLock::new(|| {
    vec![
        GrammarRule::new("bare hours", r"^(?P<h>\d+)$", bare_hours),
        GrammarRule::new("pure hours", &pure_hours_pattern(), pure_hours),
        GrammarRule::new("hours and minutes", &hours_minutes_pattern(), hours_minutes),
        GrammarRule::new("hours, minutes and seconds", &hms_pattern(), hms),
    ]
});

/// Split a duration into its components without converting
fn parse_duration_components(text: &str) -> Result<Hms> {
    parse_with(&DURATION_RULES, FieldKind::Exposure, text)
}

/// Parse an exposure length such as `1h30m20s`, `10.5m` or `12.h5` into seconds
pub fn parse_duration(text: &str) -> Result<f64> {
    parse_duration_components(text).map(|hms| hms.total_seconds())
}

/// Parse a clock reading such as `21h30m` or `21` into a normalized time of day
///
/// Minutes and seconds are derived from the total, so `21.5h` and `21.h5`
/// both become `21:30:00`.
pub fn parse_clock(text: &str) -> Result<ClockTime> {
    let hms = parse_with(&CLOCK_RULES, FieldKind::ClockTime, text)?;

    if hms.minutes >= 60.0 || hms.seconds >= 60.0 {
        return Err(PlateError::format(
            FieldKind::ClockTime,
            text,
            "minutes and seconds must be below 60",
        ));
    }

    let total = hms.total_seconds().round();
    if total >= f64::from(SECONDS_PER_DAY) {
        return Err(PlateError::format(
            FieldKind::ClockTime,
            text,
            "time of day must be below 24h",
        ));
    }

    Ok(ClockTime::from_total_seconds(total as u32))
}

/// Name of the duration rule that accepts `text`
#[cfg(test)]
fn duration_rule(text: &str) -> Option<&'static str> {
    super::matching_rule(&DURATION_RULES, text)
}

/// Name of the clock rule that accepts `text`
#[cfg(test)]
fn clock_rule(text: &str) -> Option<&'static str> {
    super::matching_rule(&CLOCK_RULES, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_format_error(result: Result<impl std::fmt::Debug>, expected_text: &str) {
        match result {
            Err(PlateError::Format { text, .. }) => assert_eq!(text, expected_text),
            other => panic!("Expected Format error for '{}', got {:?}", expected_text, other),
        }
    }

    #[test]
    fn test_full_duration() {
        assert_eq!(parse_duration("1h30m20s").unwrap(), 5420.0);
    }

    #[test]
    fn test_fractional_minutes() {
        assert_eq!(parse_duration("10.5m").unwrap(), 630.0);
    }

    #[test]
    fn test_pure_hours() {
        assert_eq!(parse_duration("1h").unwrap(), 3600.0);
        assert_eq!(parse_duration("1.5h").unwrap(), 5400.0);
        assert_eq!(duration_rule("2h"), Some("pure hours"));
    }

    #[test]
    fn test_infix_half_hour_shorthand() {
        assert_eq!(parse_duration("12.h5").unwrap(), 12.5 * 3600.0);
        assert_eq!(parse_duration("1.h25").unwrap(), 1.25 * 3600.0);
        assert_eq!(duration_rule("12.h5"), Some("pure hours"));
    }

    #[test]
    fn test_hours_minutes_suffix_optional() {
        assert_eq!(parse_duration("1h30").unwrap(), 5400.0);
        assert_eq!(parse_duration("1h30m").unwrap(), 5400.0);
        assert_eq!(duration_rule("1h30"), Some("hours and minutes"));
        assert_eq!(duration_rule("1h30m"), Some("hours and minutes"));
    }

    #[test]
    fn test_trailing_seconds_suffix_optional() {
        assert_eq!(parse_duration("1h30m20").unwrap(), 5420.0);
        assert_eq!(parse_duration("2m30").unwrap(), 150.0);
        assert_eq!(duration_rule("1h30m20"), Some("hours, minutes and seconds"));
    }

    #[test]
    fn test_single_units() {
        assert_eq!(parse_duration("30s").unwrap(), 30.0);
        assert_eq!(parse_duration("20m").unwrap(), 1200.0);
        assert_eq!(parse_duration("5m10s").unwrap(), 310.0);
    }

    #[test]
    fn test_surrounding_spaces() {
        assert_eq!(parse_duration(" 2h ").unwrap(), 7200.0);
    }

    #[test]
    fn test_unit_without_digits_fails() {
        assert_format_error(parse_duration("s"), "s");
        assert_format_error(parse_duration("s23m"), "s23m");
        assert_format_error(parse_duration("h"), "h");
    }

    #[test]
    fn test_bare_integer_is_not_a_duration() {
        assert_format_error(parse_duration("20"), "20");
        assert_format_error(parse_duration("1.5"), "1.5");
    }

    #[test]
    fn test_empty_duration_fails() {
        assert_format_error(parse_duration(""), "");
    }

    #[test]
    fn test_garbage_fails() {
        assert_format_error(parse_duration("1x"), "1x");
        assert_format_error(parse_duration("1h 30m"), "1h 30m");
        assert_format_error(parse_duration("-5m"), "-5m");
    }

    #[test]
    fn test_clock_accepts_bare_hours() {
        assert_eq!(parse_clock("21").unwrap().to_string(), "21:00:00");
        assert_eq!(clock_rule("21"), Some("bare hours"));
        // the duration grammar refuses the very same text
        assert!(parse_duration("21").is_err());
    }

    #[test]
    fn test_clock_from_components() {
        assert_eq!(parse_clock("21h30m").unwrap().to_string(), "21:30:00");
        assert_eq!(parse_clock("21h30").unwrap().to_string(), "21:30:00");
        assert_eq!(parse_clock("3h05m20s").unwrap().to_string(), "03:05:20");
        assert_eq!(parse_clock("0h5m").unwrap().to_string(), "00:05:00");
    }

    #[test]
    fn test_clock_derives_minutes_from_fraction() {
        assert_eq!(parse_clock("21.5h").unwrap().to_string(), "21:30:00");
        assert_eq!(parse_clock("21.h5").unwrap().to_string(), "21:30:00");
        assert_eq!(parse_clock("2.25h").unwrap().to_string(), "02:15:00");
        assert_eq!(parse_clock("1h30.5m").unwrap().to_string(), "01:30:30");
    }

    #[test]
    fn test_clock_rejects_out_of_range() {
        assert_format_error(parse_clock("24"), "24");
        assert_format_error(parse_clock("25h10m"), "25h10m");
        assert_format_error(parse_clock("21h75m"), "21h75m");
    }

    #[test]
    fn test_clock_rejects_malformed() {
        assert_format_error(parse_clock("s"), "s");
        assert_format_error(parse_clock(""), "");
        assert_format_error(parse_clock("21:30"), "21:30");
    }
}
