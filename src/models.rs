//! Core data structures for plate normalization.
//!
//! Defines the typed values produced by the field parsers, the ordered
//! card sets they expand into, the raw logbook record of a plate and the
//! statistics reported by batch processing.

use chrono::{Datelike, NaiveDate};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Logical kind of a logbook field, carried by format errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Exposure,
    ClockTime,
    Declination,
    RightAscension,
    Date,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Exposure => "exposure time",
            FieldKind::ClockTime => "clock time",
            FieldKind::Declination => "declination",
            FieldKind::RightAscension => "right ascension",
            FieldKind::Date => "date",
        };
        f.write_str(name)
    }
}

/// Time scale a clock reading was recorded in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeScale {
    /// Local civil (decree) time
    Local,
    /// Local sidereal time
    Sidereal,
}

impl TimeScale {
    /// Label used in the TIMEFORM card
    pub fn label(&self) -> &'static str {
        match self {
            TimeScale::Local => "LT",
            TimeScale::Sidereal => "ST",
        }
    }
}

/// A clock reading normalized to whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl ClockTime {
    /// Split a total number of seconds into an hour/minute/second triple
    pub fn from_total_seconds(total: u32) -> Self {
        Self {
            hour: total / 3600,
            minute: (total % 3600) / 60,
            second: total % 60,
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// Clock reading tagged with the scale of the field it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedClockTime {
    pub time: ClockTime,
    pub scale: TimeScale,
}

/// Signed angle in degrees plus its canonical sexagesimal rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCoordinate {
    pub degrees: f64,
    pub canonical: String,
}

/// Calendar date with a four digit year, rendered "dd.mm.yyyy"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParsedDate(NaiveDate);

impl ParsedDate {
    /// Returns None for dates that do not exist in the calendar
    pub fn new(day: u32, month: u32, year: i32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }
}

impl fmt::Display for ParsedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}.{:02}.{:04}", self.day(), self.month(), self.year())
    }
}

/// Scalar value of a single header card
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CardValue {
    Float(f64),
    Integer(i64),
    Text(String),
}

impl fmt::Display for CardValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardValue::Float(v) => write!(f, "{}", v),
            CardValue::Integer(v) => write!(f, "{}", v),
            CardValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<f64> for CardValue {
    fn from(value: f64) -> Self {
        CardValue::Float(value)
    }
}

impl From<i64> for CardValue {
    fn from(value: i64) -> Self {
        CardValue::Integer(value)
    }
}

impl From<String> for CardValue {
    fn from(value: String) -> Self {
        CardValue::Text(value)
    }
}

impl From<&str> for CardValue {
    fn from(value: &str) -> Self {
        CardValue::Text(value.to_string())
    }
}

impl From<ParsedDate> for CardValue {
    fn from(value: ParsedDate) -> Self {
        CardValue::Text(value.to_string())
    }
}

impl From<ClockTime> for CardValue {
    fn from(value: ClockTime) -> Self {
        CardValue::Text(value.to_string())
    }
}

impl From<ParsedClockTime> for CardValue {
    fn from(value: ParsedClockTime) -> Self {
        value.time.into()
    }
}

/// Insertion-ordered key/value mapping for one normalized attribute
///
/// Keys are unique; inserting an existing key replaces its value in place
/// so emission order stays that of first insertion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardSet {
    cards: Vec<(String, CardValue)>,
}

impl CardSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<CardValue>) {
        let key = key.into();
        let value = value.into();
        match self.cards.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.cards.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&CardValue> {
        self.cards.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cards.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CardValue)> {
        self.cards.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Append every card of `other`, keeping this set's order first
    pub fn extend(&mut self, other: CardSet) {
        for (key, value) in other.cards {
            self.insert(key, value);
        }
    }
}

impl Serialize for CardSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cards.len()))?;
        for (key, value) in &self.cards {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Raw logbook fields of one plate, keyed by canonical field name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlateRecord {
    pub plate_id: String,
    pub source_file: String,
    pub fields: BTreeMap<String, String>,
}

impl PlateRecord {
    pub fn new(plate_id: impl Into<String>, source_file: impl Into<String>) -> Self {
        Self {
            plate_id: plate_id.into(),
            source_file: source_file.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// A plate rejected during batch processing
#[derive(Debug, Clone, Serialize)]
pub struct PlateFailure {
    pub plate_id: String,
    pub image_path: PathBuf,
    pub reason: String,
    /// Caused by the logbook entry rather than the filesystem or catalogue
    pub data_error: bool,
}

/// Processing statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub images_found: usize,
    pub plates_annotated: usize,
    pub plates_skipped: usize,
    pub plates_failed: usize,
    pub failures: Vec<PlateFailure>,
    pub processing_time_ms: u128,
}

impl ProcessingStats {
    /// Failures whose logbook entry needs correcting
    pub fn data_failures(&self) -> usize {
        self.failures.iter().filter(|f| f.data_error).count()
    }
}

/// Plate that failed a parse-only check of the catalogue
#[derive(Debug, Clone, Serialize)]
pub struct CheckFailure {
    pub plate_id: String,
    pub source_file: String,
    pub reason: String,
}

#[derive(Debug, Default, Serialize)]
pub struct CheckReport {
    pub plates_checked: usize,
    pub failures: Vec<CheckFailure>,
}

impl CheckReport {
    pub fn plates_valid(&self) -> usize {
        self.plates_checked - self.failures.len()
    }
}
