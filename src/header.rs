//! FITS header assembly and sidecar output.
//!
//! A plate header is the static observatory cards followed by the
//! normalized plate cards, rendered as 80-column FITS cards, closed by
//! `END` and padded with spaces to whole 2880-byte blocks. The header is
//! written next to the scanned image as `<image>.hdr`; an existing sidecar
//! marks the image as already processed.

use crate::config::ObservatoryConfig;
use crate::constants::{
    FITS_BLOCK_LENGTH, FITS_CARD_LENGTH, FITS_KEYWORD_LENGTH, HEADER_EXTENSION, keywords,
};
use crate::error::{PlateError, Result};
use crate::models::{CardSet, CardValue};
use crate::normalize::NormalizedPlate;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Column (zero-based) where fixed-format values start
const VALUE_COLUMN: usize = 10;

/// Column (one-based) where fixed-format numbers end
const NUMBER_END_COLUMN: usize = 30;

/// Shortest quoted string body allowed by the fixed format
const MIN_STRING_LENGTH: usize = 8;

#[derive(Debug, Clone)]
pub struct PlateHeader {
    plate_id: String,
    cards: CardSet,
}

impl PlateHeader {
    /// Merge the observatory cards with the cards of one plate
    pub fn assemble(observatory: &ObservatoryConfig, plate: &NormalizedPlate) -> Self {
        let mut cards = CardSet::new();
        cards.insert(keywords::ORIGIN, observatory.origin.as_str());
        cards.insert(keywords::OBSERVAT, observatory.observatory.as_str());
        cards.insert(keywords::SITELONG, observatory.site_longitude);
        cards.insert(keywords::SITELAT, observatory.site_latitude);
        cards.insert(keywords::SITEELEV, observatory.site_elevation);
        cards.insert(keywords::PLATENUM, plate.plate_id.as_str());
        cards.extend(plate.cards.clone());

        Self {
            plate_id: plate.plate_id.clone(),
            cards,
        }
    }

    pub fn cards(&self) -> &CardSet {
        &self.cards
    }

    /// Render the header as FITS cards padded to whole blocks
    pub fn render(&self) -> Result<String> {
        let mut out = String::with_capacity(FITS_BLOCK_LENGTH);
        for (keyword, value) in self.cards.iter() {
            out.push_str(&format_card(keyword, value)?);
        }
        out.push_str(&format!("{:<width$}", "END", width = FITS_CARD_LENGTH));

        let remainder = out.len() % FITS_BLOCK_LENGTH;
        if remainder != 0 {
            out.push_str(&" ".repeat(FITS_BLOCK_LENGTH - remainder));
        }
        Ok(out)
    }

    /// Write the rendered header next to `image`, replacing any previous sidecar
    pub fn write_sidecar(&self, image: &Path) -> Result<PathBuf> {
        let rendered = self.render()?;
        let target = sidecar_path(image);
        let dir = target.parent().unwrap_or_else(|| Path::new("."));

        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(rendered.as_bytes())?;
        temp.persist(&target).map_err(|e| PlateError::Io(e.error))?;

        debug!(
            "Wrote {} cards for plate {} to {}",
            self.cards.len(),
            self.plate_id,
            target.display()
        );
        Ok(target)
    }
}

/// `<image>.hdr` next to the image, keeping the image extension
pub fn sidecar_path(image: &Path) -> PathBuf {
    let mut name = image.as_os_str().to_os_string();
    name.push(".");
    name.push(HEADER_EXTENSION);
    PathBuf::from(name)
}

pub fn is_processed(image: &Path) -> bool {
    sidecar_path(image).exists()
}

/// Format one 80-column card
fn format_card(keyword: &str, value: &CardValue) -> Result<String> {
    validate_keyword(keyword)?;

    let value = format_value(keyword, value)?;
    let mut card = format!("{:<8}= ", keyword);
    if value.starts_with('\'') {
        card.push_str(&value);
    } else {
        let width = NUMBER_END_COLUMN - VALUE_COLUMN;
        card.push_str(&format!("{:>width$}", value, width = width));
    }

    if card.len() > FITS_CARD_LENGTH {
        return Err(PlateError::InvalidCard {
            keyword: keyword.to_string(),
            reason: format!("value does not fit in {} columns", FITS_CARD_LENGTH),
        });
    }
    Ok(format!("{:<width$}", card, width = FITS_CARD_LENGTH))
}

fn validate_keyword(keyword: &str) -> Result<()> {
    if keyword.is_empty() || keyword.len() > FITS_KEYWORD_LENGTH {
        return Err(PlateError::InvalidCard {
            keyword: keyword.to_string(),
            reason: format!("keyword must be 1 to {} characters", FITS_KEYWORD_LENGTH),
        });
    }
    let valid = keyword
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if !valid {
        return Err(PlateError::InvalidCard {
            keyword: keyword.to_string(),
            reason: "keyword may only hold A-Z, 0-9, '-' and '_'".to_string(),
        });
    }
    Ok(())
}

fn format_value(keyword: &str, value: &CardValue) -> Result<String> {
    match value {
        CardValue::Integer(v) => Ok(v.to_string()),
        CardValue::Float(v) => {
            if !v.is_finite() {
                return Err(PlateError::InvalidCard {
                    keyword: keyword.to_string(),
                    reason: format!("{} is not a finite number", v),
                });
            }
            let mut text = v.to_string();
            if !text.contains('.') && !text.contains('e') {
                text.push_str(".0");
            }
            Ok(text)
        }
        CardValue::Text(v) => {
            if !v.chars().all(|c| (' '..='~').contains(&c)) {
                return Err(PlateError::InvalidCard {
                    keyword: keyword.to_string(),
                    reason: format!("'{}' holds characters outside printable ASCII", v),
                });
            }
            let escaped = v.replace('\'', "''");
            Ok(format!(
                "'{:<width$}'",
                escaped,
                width = MIN_STRING_LENGTH
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn plate() -> NormalizedPlate {
        let mut cards = CardSet::new();
        cards.insert("OBJECT", "M 42");
        cards.insert("EXPTIME", 3600.0);
        cards.insert("NUMEXP", 1i64);
        NormalizedPlate {
            plate_id: "GAF001".to_string(),
            source_file: "fai50mak".to_string(),
            cards,
        }
    }

    #[test]
    fn test_assemble_puts_observatory_cards_first() {
        let header = PlateHeader::assemble(&ObservatoryConfig::default(), &plate());
        let keys: Vec<&str> = header.cards().keys().collect();
        assert_eq!(
            keys,
            vec![
                "ORIGIN", "OBSERVAT", "SITELONG", "SITELAT", "SITEELEV", "PLATENUM", "OBJECT",
                "EXPTIME", "NUMEXP",
            ]
        );
        assert_eq!(
            header.cards().get("PLATENUM"),
            Some(&CardValue::Text("GAF001".to_string()))
        );
    }

    #[test]
    fn test_render_is_block_aligned() {
        let header = PlateHeader::assemble(&ObservatoryConfig::default(), &plate());
        let rendered = header.render().unwrap();

        assert_eq!(rendered.len() % FITS_BLOCK_LENGTH, 0);
        assert_eq!(rendered.len(), FITS_BLOCK_LENGTH);
        let end_card = &rendered[9 * FITS_CARD_LENGTH..10 * FITS_CARD_LENGTH];
        assert!(end_card.starts_with("END "));
        assert!(rendered[10 * FITS_CARD_LENGTH..].trim().is_empty());
    }

    #[test]
    fn test_card_layout() {
        let card = format_card("EXPTIME", &CardValue::Float(3600.0)).unwrap();
        assert_eq!(card.len(), 80);
        assert_eq!(&card[..10], "EXPTIME = ");
        assert_eq!(card[10..30].trim_start(), "3600.0");
        assert_eq!(&card[24..30], "3600.0");

        let card = format_card("NUMEXP", &CardValue::Integer(3)).unwrap();
        assert_eq!(&card[29..30], "3");

        let card = format_card("OBJECT", &CardValue::Text("M 42".to_string())).unwrap();
        assert_eq!(card.trim_end(), "OBJECT  = 'M 42    '");
    }

    #[test]
    fn test_quotes_are_doubled() {
        let card = format_card("OBSERVER", &CardValue::Text("O'Neil".to_string())).unwrap();
        assert_eq!(card.trim_end(), "OBSERVER= 'O''Neil '");
    }

    #[test]
    fn test_invalid_cards() {
        assert!(matches!(
            format_card("TMS-ORI10", &CardValue::Text("21:00:00".to_string())),
            Err(PlateError::InvalidCard { .. })
        ));
        assert!(format_card("object", &CardValue::Integer(1)).is_err());
        assert!(format_card("OBJECT", &CardValue::Text("Орион".to_string())).is_err());
        assert!(format_card("OBJECT", &CardValue::Text("x".repeat(80))).is_err());
        assert!(format_card("EXPTIME", &CardValue::Float(f64::NAN)).is_err());
    }

    #[test]
    fn test_sidecar_roundtrip() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("fai50mak_GAF001.fit");
        std::fs::write(&image, b"").unwrap();
        assert!(!is_processed(&image));

        let header = PlateHeader::assemble(&ObservatoryConfig::default(), &plate());
        let written = header.write_sidecar(&image).unwrap();

        assert_eq!(written, dir.path().join("fai50mak_GAF001.fit.hdr"));
        assert!(is_processed(&image));
        let content = std::fs::read_to_string(&written).unwrap();
        assert!(content.starts_with("ORIGIN  = 'FAI plate archive'"));
        assert_eq!(content.len() % FITS_BLOCK_LENGTH, 0);
    }
}
