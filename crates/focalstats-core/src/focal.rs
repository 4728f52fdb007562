use regex::Regex;
use std::sync::LazyLock;

use crate::extract::MetadataRecord;

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\d.]+").unwrap());

/// Extract the leading number of a focal-length field ("35 mm" -> 35.0).
///
/// EXIF writes 0 for an unknown focal length, so non-positive values are
/// treated as absent along with fields that have no leading number.
pub fn parse_focal_mm(text: &str) -> Option<f64> {
    let m = LEADING_NUMBER.find(text)?;
    let mm: f64 = m.as_str().parse().ok()?;
    (mm > 0.0).then_some(mm)
}

fn field_mm(field: &Option<String>) -> Option<f64> {
    field.as_deref().and_then(parse_focal_mm)
}

/// Round a focal length to whole millimeters, halves away from zero.
pub fn round_mm(mm: f64) -> u32 {
    mm.round() as u32
}

struct CropRule {
    /// Uppercase substring of the manufacturer name
    make_marker: &'static str,
    factor: f64,
}

static CROP_RULES: &[CropRule] = &[CropRule {
    make_marker: "FUJIFILM",
    factor: 1.5,
}];

/// Manufacturers without a rule are assumed to be full frame.
pub const FULL_FRAME: f64 = 1.0;

pub fn crop_factor(make: &str) -> f64 {
    let make = make.to_uppercase();
    CROP_RULES
        .iter()
        .find(|rule| make.contains(rule.make_marker))
        .map_or(FULL_FRAME, |rule| rule.factor)
}

/// Where a 35mm-equivalent value came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EquivalentSource {
    /// exiftool's Composite:FocalLength35mm
    Composite,
    /// FocalLengthIn35mmFormat tag
    Tagged,
    /// Native focal length times this crop factor
    CropFactor(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Equivalent {
    pub mm: f64,
    pub source: EquivalentSource,
}

type Rule = fn(&MetadataRecord, Option<f64>) -> Option<Equivalent>;

/// Tried in order, first hit wins.
static EQUIVALENT_RULES: &[Rule] = &[from_composite, from_tag, from_crop_factor];

fn from_composite(record: &MetadataRecord, _native: Option<f64>) -> Option<Equivalent> {
    field_mm(&record.composite_focal_length_35mm).map(|mm| Equivalent {
        mm,
        source: EquivalentSource::Composite,
    })
}

fn from_tag(record: &MetadataRecord, _native: Option<f64>) -> Option<Equivalent> {
    field_mm(&record.focal_length_35mm).map(|mm| Equivalent {
        mm,
        source: EquivalentSource::Tagged,
    })
}

fn from_crop_factor(record: &MetadataRecord, native: Option<f64>) -> Option<Equivalent> {
    let factor = crop_factor(record.make());
    native.map(|mm| Equivalent {
        mm: mm * factor,
        source: EquivalentSource::CropFactor(factor),
    })
}

/// 35mm-equivalent focal length for a record, `None` when nothing to go on.
pub fn equivalent_focal_length(record: &MetadataRecord, native: Option<f64>) -> Option<Equivalent> {
    EQUIVALENT_RULES.iter().find_map(|rule| rule(record, native))
}

/// Native focal length of a record in millimeters.
pub fn native_focal_length(record: &MetadataRecord) -> Option<f64> {
    field_mm(&record.focal_length)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(make: &str, fl35: Option<&str>, composite: Option<&str>) -> MetadataRecord {
        MetadataRecord {
            make: Some(make.to_string()),
            model: None,
            focal_length: Some("23.0 mm".to_string()),
            focal_length_35mm: fl35.map(str::to_string),
            composite_focal_length_35mm: composite.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_focal_mm() {
        assert_eq!(parse_focal_mm("35 mm"), Some(35.0));
        assert_eq!(parse_focal_mm("23.0 mm"), Some(23.0));
        assert_eq!(parse_focal_mm("6.86"), Some(6.86));
        assert_eq!(parse_focal_mm(""), None);
        assert_eq!(parse_focal_mm("mm"), None);
        assert_eq!(parse_focal_mm(" 35 mm"), None);
        assert_eq!(parse_focal_mm("0 mm"), None);
        assert_eq!(parse_focal_mm("1.2.3"), None);
        assert_eq!(field_mm(&None), None);
    }

    #[test]
    fn test_composite_wins() {
        let rec = record("FUJIFILM", Some("35 mm"), Some("34.5 mm"));
        let eq = equivalent_focal_length(&rec, Some(23.0)).unwrap();
        assert_eq!(eq.mm, 34.5);
        assert_eq!(eq.source, EquivalentSource::Composite);
    }

    #[test]
    fn test_tag_before_crop_factor() {
        let rec = record("FUJIFILM", Some("35 mm"), None);
        let eq = equivalent_focal_length(&rec, Some(23.0)).unwrap();
        assert_eq!(eq.mm, 35.0);
        assert_eq!(eq.source, EquivalentSource::Tagged);

        // A zero tag means unknown and falls through
        let rec = record("FUJIFILM", Some("0"), Some("0.0 mm"));
        let eq = equivalent_focal_length(&rec, Some(23.0)).unwrap();
        assert_eq!(eq.source, EquivalentSource::CropFactor(1.5));
    }

    #[test]
    fn test_crop_factor() {
        let rec = record("Fujifilm Corporation", None, None);
        let eq = equivalent_focal_length(&rec, Some(23.0)).unwrap();
        assert_eq!(eq.mm, 34.5);
        assert_eq!(round_mm(eq.mm), 35);

        let rec = record("SONY", None, None);
        let eq = equivalent_focal_length(&rec, Some(23.0)).unwrap();
        assert_eq!(eq.mm, 23.0);
        assert_eq!(eq.source, EquivalentSource::CropFactor(FULL_FRAME));
    }

    #[test]
    fn test_unavailable() {
        let rec = record("FUJIFILM", None, None);
        assert_eq!(equivalent_focal_length(&rec, None), None);
        assert_eq!(equivalent_focal_length(&MetadataRecord::default(), None), None);
    }

    #[test]
    fn test_round_mm() {
        assert_eq!(round_mm(34.5), 35);
        assert_eq!(round_mm(34.49), 34);
        assert_eq!(round_mm(6.86), 7);
    }
}
