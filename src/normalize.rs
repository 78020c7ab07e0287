//! Per-plate normalization pipeline.
//!
//! Turns the raw logbook fields of one plate into an ordered card set.
//! Every field goes through the same steps: split on `;`, parse each item
//! with the field's grammar, expand into primary and numbered cards. A
//! single failing field rejects the whole plate; nothing is returned for
//! partially normalized plates.

use crate::cards::{expand_cards, or_unknown, split_and_parse};
use crate::config::{AnnotatorConfig, EmptyFieldPolicy};
use crate::constants::{POLARISATION_MARKER, fields, keywords};
use crate::error::{PlateError, Result};
use crate::models::{CardSet, FieldKind, ParsedClockTime, PlateRecord, TimeScale};
use crate::parsers::{parse_clock, parse_date_item, parse_dec, parse_duration, parse_ra};
use crate::tables::TranslationTables;
use serde::Serialize;
use std::sync::{Arc, LazyLock};
use tracing::debug;

/// Clock fields with the scale they are recorded in and their card keys
const CLOCK_FIELDS: &[(&str, TimeScale, &str, &str)] = &[
    (
        fields::LT_START,
        TimeScale::Local,
        keywords::TMS_ORIG,
        keywords::TMS_ORIG_PREFIX,
    ),
    (
        fields::LT_END,
        TimeScale::Local,
        keywords::TME_ORIG,
        keywords::TME_ORIG_PREFIX,
    ),
    (
        fields::ST_START,
        TimeScale::Sidereal,
        keywords::STS_ORIG,
        keywords::STS_ORIG_PREFIX,
    ),
    (
        fields::ST_END,
        TimeScale::Sidereal,
        keywords::STE_ORIG,
        keywords::STE_ORIG_PREFIX,
    ),
];

static NON_PRINTABLE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"[^ -~]+").expect("static regex must compile"));

/// Normalized cards of one plate
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedPlate {
    pub plate_id: String,
    pub source_file: String,
    pub cards: CardSet,
}

/// Normalizes plate records against a fixed set of translation tables
#[derive(Debug, Clone)]
pub struct PlateNormalizer {
    tables: Arc<TranslationTables>,
    config: AnnotatorConfig,
}

impl PlateNormalizer {
    pub fn new(tables: Arc<TranslationTables>, config: AnnotatorConfig) -> Self {
        Self { tables, config }
    }

    /// Normalize every field of `record`
    pub fn normalize(&self, record: &PlateRecord) -> Result<NormalizedPlate> {
        if let Some(field) = fields::REQUIRED.iter().find(|f| record.field(f).is_none()) {
            return Err(PlateError::MissingField {
                plate_id: record.plate_id.clone(),
                field: field.to_string(),
            });
        }

        let mut cards = CardSet::new();

        if let Some(object) = self.optional_field(record, fields::OBJECT)? {
            if let Some(object) = self.object_card(record, object)? {
                cards.extend(object);
            }
        }

        cards.extend(self.date_cards(required_field(record, fields::DATE)?)?);

        let mut scales: Vec<TimeScale> = Vec::new();
        for &(field, scale, primary_key, prefix) in CLOCK_FIELDS {
            if let Some(raw) = self.optional_field(record, field)? {
                cards.extend(self.clock_cards(raw, scale, primary_key, prefix)?);
                if !scales.contains(&scale) {
                    scales.push(scale);
                }
            }
        }
        if !scales.is_empty() {
            let labels: Vec<&str> = scales.iter().map(TimeScale::label).collect();
            cards.insert(keywords::TIMEFORM, labels.join(","));
        }

        cards.extend(self.ra_cards(required_field(record, fields::RA)?)?);
        cards.extend(self.dec_cards(required_field(record, fields::DEC)?)?);
        cards.extend(self.exposure_cards(required_field(record, fields::EXPOSURE)?)?);

        if let Some(observer) = self.optional_field(record, fields::OBSERVER)? {
            cards.extend(self.observer_cards(observer)?);
        }
        if let Some(telescope) = self.optional_field(record, fields::TELESCOPE)? {
            cards.extend(self.telescope_cards(telescope)?);
        }

        debug!(
            "Normalized plate {} into {} cards",
            record.plate_id,
            cards.len()
        );

        Ok(NormalizedPlate {
            plate_id: record.plate_id.clone(),
            source_file: record.source_file.clone(),
            cards,
        })
    }

    /// Exposure lengths in seconds, in logbook order
    ///
    /// A `*` anywhere in the cell marks a polarisation series, which has no
    /// single exposure and is recorded as the unknown sentinel.
    pub fn exposure_values(&self, raw: &str) -> Result<Vec<f64>> {
        if raw.contains(POLARISATION_MARKER) {
            return match self.config.exposure_unknown {
                Some(sentinel) => Ok(vec![sentinel]),
                None => Err(PlateError::format(
                    FieldKind::Exposure,
                    raw,
                    "polarisation series has no single exposure",
                )),
            };
        }

        let raw = if self.config.exposure_comma_separator {
            raw.replace(',', ";")
        } else {
            raw.to_string()
        };

        match self.config.exposure_unknown {
            Some(sentinel) => split_and_parse(&raw, or_unknown(parse_duration, sentinel)),
            None => split_and_parse(&raw, parse_duration),
        }
    }

    pub fn exposure_cards(&self, raw: &str) -> Result<CardSet> {
        let values = self.exposure_values(raw)?;
        let mut cards = expand_cards(&values, keywords::EXPTIME, keywords::EXPTIME_PREFIX);
        cards.insert(keywords::NUMEXP, values.len() as i64);
        Ok(cards)
    }

    pub fn date_cards(&self, raw: &str) -> Result<CardSet> {
        let dates = split_and_parse(raw, parse_date_item)?;
        Ok(expand_cards(
            &dates,
            keywords::DATEORIG,
            keywords::DATEORIG_PREFIX,
        ))
    }

    pub fn clock_cards(
        &self,
        raw: &str,
        scale: TimeScale,
        primary_key: &str,
        prefix: &str,
    ) -> Result<CardSet> {
        let times: Vec<ParsedClockTime> = split_and_parse(raw, |item| {
            parse_clock(item).map(|time| ParsedClockTime { time, scale })
        })?;
        Ok(expand_cards(&times, primary_key, prefix))
    }

    pub fn ra_cards(&self, raw: &str) -> Result<CardSet> {
        let ra = parse_ra(raw)?;
        let mut cards = CardSet::new();
        cards.insert(keywords::RA_ORIG, ra.canonical);
        cards.insert(keywords::RA_DEG, ra.degrees);
        Ok(cards)
    }

    pub fn dec_cards(&self, raw: &str) -> Result<CardSet> {
        let dec = parse_dec(raw)?;
        let mut cards = CardSet::new();
        cards.insert(keywords::DEC_ORIG, dec.canonical);
        cards.insert(keywords::DEC_DEG, dec.degrees);
        Ok(cards)
    }

    /// Observers translated to canonical names; several observers are joined with ", "
    pub fn observer_cards(&self, raw: &str) -> Result<CardSet> {
        let names = split_and_parse(raw, |item| {
            self.tables.observer_name(item).map(str::to_string)
        })?;
        let mut cards = CardSet::new();
        cards.insert(keywords::OBSERVER, names.join(", "));
        Ok(cards)
    }

    pub fn telescope_cards(&self, raw: &str) -> Result<CardSet> {
        let name = self.tables.telescope_name(raw)?;
        let spec = self.tables.telescope_spec(name)?;

        let mut cards = CardSet::new();
        cards.insert(keywords::TELESCOP, name);
        cards.insert(keywords::FOCLEN, spec.focal_length);
        cards.insert(keywords::PLATESZ1, spec.plate_width);
        cards.insert(keywords::PLATESZ2, spec.plate_height);
        cards.insert(keywords::FOV1, spec.field_width);
        cards.insert(keywords::FOV2, spec.field_height);
        cards.insert(keywords::APERTURE, spec.corrector_diameter);
        cards.insert(keywords::MIRRDIAM, spec.mirror_diameter);
        Ok(cards)
    }

    /// Object name with non-printable and non-ASCII characters removed
    fn object_card(&self, record: &PlateRecord, raw: &str) -> Result<Option<CardSet>> {
        let cleaned = NON_PRINTABLE.replace_all(raw, "");
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            return match self.config.empty_optional {
                EmptyFieldPolicy::Omit => Ok(None),
                EmptyFieldPolicy::Reject => Err(PlateError::MissingField {
                    plate_id: record.plate_id.clone(),
                    field: fields::OBJECT.to_string(),
                }),
            };
        }
        let mut cards = CardSet::new();
        cards.insert(keywords::OBJECT, cleaned);
        Ok(Some(cards))
    }

    /// Value of an optional field; blank cells follow the configured policy
    fn optional_field<'a>(&self, record: &'a PlateRecord, field: &str) -> Result<Option<&'a str>> {
        match record.field(field) {
            None => Ok(None),
            Some(value) if value.trim().is_empty() => match self.config.empty_optional {
                EmptyFieldPolicy::Omit => Ok(None),
                EmptyFieldPolicy::Reject => Err(PlateError::MissingField {
                    plate_id: record.plate_id.clone(),
                    field: field.to_string(),
                }),
            },
            Some(value) => Ok(Some(value)),
        }
    }
}

/// Value of a field every plate must carry; blank cells are left to the grammar
fn required_field<'a>(record: &'a PlateRecord, field: &str) -> Result<&'a str> {
    record.field(field).ok_or_else(|| PlateError::MissingField {
        plate_id: record.plate_id.clone(),
        field: field.to_string(),
    })
}
