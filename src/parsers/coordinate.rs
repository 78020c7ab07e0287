//! Right ascension and declination.
//!
//! Unlike exposure durations, right ascension never defaults a missing
//! component: `12h` on its own is rejected because the logbook gave no
//! minutes precision.

use super::{GrammarRule, NUMBER, SEPARATOR, group_f64, parse_with};
use crate::error::Result;
use crate::models::{FieldKind, ParsedCoordinate};
use regex::Captures;
use std::sync::LazyLock;

const DEGREES_PER_HOUR: f64 = 360.0 / 24.0;

/// Sign, whole unit, minutes and seconds as read from the text
#[derive(Debug, Clone, Copy, PartialEq)]
struct Sexagesimal {
    negative: bool,
    whole: f64,
    minutes: f64,
    seconds: f64,
}

impl Sexagesimal {
    fn magnitude(&self) -> f64 {
        self.whole + self.minutes / 60.0 + self.seconds / 3600.0
    }

    fn signed(&self) -> f64 {
        if self.negative {
            -self.magnitude()
        } else {
            self.magnitude()
        }
    }
}

fn components(captures: &Captures<'_>) -> std::result::Result<Sexagesimal, String> {
    let negative = captures.name("sign").is_some_and(|m| m.as_str() == "-");
    let whole = group_f64(captures, "whole")?.unwrap_or(0.0);
    let minutes = group_f64(captures, "min")?.unwrap_or(0.0);
    let seconds = group_f64(captures, "sec")?.unwrap_or(0.0);

    if minutes >= 60.0 {
        return Err(format!("minutes {} out of range", minutes));
    }
    if seconds >= 60.0 {
        return Err(format!("seconds {} out of range", seconds));
    }

    Ok(Sexagesimal {
        negative,
        whole,
        minutes,
        seconds,
    })
}

/// Round a non-negative magnitude to whole seconds of its unit
fn split_sexagesimal(magnitude: f64) -> (u64, u64, u64) {
    let total = (magnitude * 3600.0).round() as u64;
    (total / 3600, (total % 3600) / 60, total % 60)
}

/// Canonical declination string, always signed: `-01:28:00`, `+45:00:00`
pub fn render_dec(degrees: f64) -> String {
    let sign = if degrees.is_sign_negative() { '-' } else { '+' };
    let (d, m, s) = split_sexagesimal(degrees.abs());
    format!("{}{:02}:{:02}:{:02}", sign, d, m, s)
}

/// Canonical right ascension string in hours, never signed: `05:33:00`
pub fn render_ra(degrees: f64) -> String {
    let (h, m, s) = split_sexagesimal(degrees.abs() / DEGREES_PER_HOUR);
    format!("{:02}:{:02}:{:02}", h, m, s)
}

fn declination(captures: &Captures<'_>) -> std::result::Result<ParsedCoordinate, String> {
    let value = components(captures)?;
    if value.magnitude() > 90.0 {
        return Err(format!("{} degrees is beyond the pole", value.magnitude()));
    }
    let degrees = value.signed();
    Ok(ParsedCoordinate {
        degrees,
        canonical: render_dec(degrees),
    })
}

fn right_ascension(captures: &Captures<'_>) -> std::result::Result<ParsedCoordinate, String> {
    let value = components(captures)?;
    // rounding to whole seconds must not produce 24:00:00
    if (value.magnitude() * 3600.0).round() >= 24.0 * 3600.0 {
        return Err(format!("{} hours is beyond 24h", value.magnitude()));
    }
    let degrees = value.magnitude() * DEGREES_PER_HOUR;
    Ok(ParsedCoordinate {
        degrees,
        canonical: render_ra(degrees),
    })
}

static DEC_RULES: LazyLock<Vec<GrammarRule<ParsedCoordinate>>> = LazyLock::new(|| {
    vec![
        GrammarRule::new(
            "decimal degrees",
            &format!(r"^(?P<sign>[+-])?(?P<whole>{NUMBER})$"),
            declination,
        ),
        GrammarRule::new(
            "sexagesimal degrees",
            &format!(
                r"^(?P<sign>[+-])?\s*(?P<whole>\d+){SEPARATOR}(?P<min>{NUMBER})(?:{SEPARATOR}(?P<sec>{NUMBER}))?$"
            ),
            declination,
        ),
    ]
});

static RA_RULES: LazyLock<Vec<GrammarRule<ParsedCoordinate>>> = LazyLock::new(|| {
    vec![
        GrammarRule::new(
            "separated hours",
            &format!(
                r"^(?P<whole>\d+){SEPARATOR}(?P<min>{NUMBER})(?:{SEPARATOR}(?P<sec>{NUMBER}))?$"
            ),
            right_ascension,
        ),
        GrammarRule::new(
            "suffixed hours",
            &format!(r"^(?P<whole>\d+)h\s*(?P<min>{NUMBER})m(?:\s*(?P<sec>{NUMBER})s)?$"),
            right_ascension,
        ),
        GrammarRule::new(
            "suffixed hours, minutes suffix optional",
            &format!(r"^(?P<whole>\d+)h\s*(?P<min>{NUMBER})m?$"),
            right_ascension,
        ),
    ]
});

/// Parse a declination such as `-23.30`, `-01 28` or `+01:28:00`
pub fn parse_dec(text: &str) -> Result<ParsedCoordinate> {
    parse_with(&DEC_RULES, FieldKind::Declination, text)
}

/// Parse a right ascension such as `05h33m`, `05 33 12` or `05:33:00`
pub fn parse_ra(text: &str) -> Result<ParsedCoordinate> {
    parse_with(&RA_RULES, FieldKind::RightAscension, text)
}

/// Name of the declination rule that accepts `text`
#[cfg(test)]
fn dec_rule(text: &str) -> Option<&'static str> {
    super::matching_rule(&DEC_RULES, text)
}

/// Name of the right ascension rule that accepts `text`
#[cfg(test)]
fn ra_rule(text: &str) -> Option<&'static str> {
    super::matching_rule(&RA_RULES, text)
}
