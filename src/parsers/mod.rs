//! Lenient field grammars for hand-written logbook notation.
//!
//! Every grammar is an ordered slice of [`GrammarRule`]s. A value is parsed
//! by trying the rules in order and handing the captures of the first rule
//! whose pattern matches the whole (trimmed) text to that rule's converter.
//! Several patterns are prefixes of one another, so the order of a rule
//! table is part of its meaning and is covered by rule-by-rule tests.

pub mod coordinate;
pub mod date;
pub mod duration;

pub use coordinate::{parse_dec, parse_ra};
pub use date::parse_date_item;
pub use duration::{parse_clock, parse_duration};

use crate::error::{PlateError, Result};
use crate::models::FieldKind;
use regex::{Captures, Regex};

/// Unsigned decimal number, as written in the logbooks
pub(crate) const NUMBER: &str = r"\d+(?:\.\d+)?";

/// Space or colon between sexagesimal components
pub(crate) const SEPARATOR: &str = r"(?:\s+|:)";

/// Converter invoked with the captures of a matching rule
pub type Converter<T> = fn(&Captures<'_>) -> std::result::Result<T, String>;

/// One named alternative of a grammar
pub struct GrammarRule<T> {
    pub name: &'static str,
    pattern: Regex,
    convert: Converter<T>,
}

impl<T> GrammarRule<T> {
    /// Compile a rule; `pattern` must be anchored at both ends
    pub fn new(name: &'static str, pattern: &str, convert: Converter<T>) -> Self {
        debug_assert!(pattern.starts_with('^') && pattern.ends_with('$'));
        Self {
            name,
            pattern: Regex::new(pattern).expect("static grammar pattern must compile"),
            convert,
        }
    }
}

/// Name of the first rule whose pattern matches `text`, if any
#[cfg(test)]
fn matching_rule<T>(rules: &[GrammarRule<T>], text: &str) -> Option<&'static str> {
    let text = text.trim();
    rules.iter().find(|rule| rule.pattern.is_match(text)).map(|rule| rule.name)
}

/// Parse `text` with the first matching rule of `rules`
///
/// A rule that matches but whose converter rejects the captured values does
/// not fall through to later rules: the first full match decides.
pub fn parse_with<T>(rules: &[GrammarRule<T>], kind: FieldKind, text: &str) -> Result<T> {
    let trimmed = text.trim();
    for rule in rules {
        if let Some(captures) = rule.pattern.captures(trimmed) {
            return (rule.convert)(&captures).map_err(|reason| {
                PlateError::format(kind, text, format!("{} ({})", reason, rule.name))
            });
        }
    }
    Err(PlateError::format(
        kind,
        text,
        "matches no accepted notation",
    ))
}

/// Numeric value of a named group; absent groups yield None
pub(crate) fn group_f64(captures: &Captures<'_>, name: &str) -> std::result::Result<Option<f64>, String> {
    match captures.name(name) {
        Some(m) => m
            .as_str()
            .parse::<f64>()
            .map(Some)
            .map_err(|e| format!("bad number '{}': {}", m.as_str(), e)),
        None => Ok(None),
    }
}

/// Integer value of a named group; absent groups yield None
pub(crate) fn group_u32(captures: &Captures<'_>, name: &str) -> std::result::Result<Option<u32>, String> {
    match captures.name(name) {
        Some(m) => m
            .as_str()
            .parse::<u32>()
            .map(Some)
            .map_err(|e| format!("bad number '{}': {}", m.as_str(), e)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::LazyLock;

    static RULES: LazyLock<Vec<GrammarRule<u32>>> = LazyLock::new(|| {
        vec![
            GrammarRule::new("short", r"^(?P<n>\d)$", |c| {
                group_u32(c, "n").map(|n| n.unwrap_or(0))
            }),
            GrammarRule::new("rejecting", r"^(?P<n>\d\d)$", |_| {
                Err("two digits are refused".to_string())
            }),
            GrammarRule::new("any", r"^(?P<n>\d+)$", |c| {
                group_u32(c, "n").map(|n| n.unwrap_or(0))
            }),
        ]
    });

    #[test]
    fn test_first_matching_rule_wins() {
        assert_eq!(matching_rule(&RULES, "7"), Some("short"));
        assert_eq!(matching_rule(&RULES, "77"), Some("rejecting"));
        assert_eq!(matching_rule(&RULES, "777"), Some("any"));
        assert_eq!(matching_rule(&RULES, "x"), None);
    }

    #[test]
    fn test_rejecting_rule_does_not_fall_through() {
        let err = parse_with(&RULES, FieldKind::Exposure, "77").unwrap_err();
        match err {
            PlateError::Format { text, reason, .. } => {
                assert_eq!(text, "77");
                assert!(reason.contains("rejecting"));
            }
            other => panic!("Expected Format error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_keeps_text_verbatim() {
        let err = parse_with(&RULES, FieldKind::Date, " abc ").unwrap_err();
        match err {
            PlateError::Format { kind, text, .. } => {
                assert_eq!(kind, FieldKind::Date);
                assert_eq!(text, " abc ");
            }
            other => panic!("Expected Format error, got {:?}", other),
        }
    }

    #[test]
    fn test_surrounding_whitespace_is_tolerated() {
        assert_eq!(parse_with(&RULES, FieldKind::Exposure, " 123 ").unwrap(), 123);
    }
}
