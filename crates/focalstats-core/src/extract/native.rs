use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use exif::{Exif, In, Reader, Tag, Value};

use super::{MetadataRecord, MetadataSource};
use crate::error::ExtractionError;

/// Reads EXIF in-process with kamadak-exif, for machines without exiftool.
/// Has no equivalent of exiftool's composite tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeExif;

impl MetadataSource for NativeExif {
    fn extract(&self, path: &Path) -> Result<MetadataRecord, ExtractionError> {
        let file = File::open(path).map_err(|source| ExtractionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let exif = Reader::new()
            .read_from_container(&mut BufReader::new(file))
            .map_err(|source| ExtractionError::Exif {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(record_from_exif(&exif))
    }
}

fn record_from_exif(exif: &Exif) -> MetadataRecord {
    MetadataRecord {
        make: ascii_field(exif, Tag::Make),
        model: ascii_field(exif, Tag::Model),
        focal_length: exif
            .get_field(Tag::FocalLength, In::PRIMARY)
            .and_then(|f| match &f.value {
                Value::Rational(v) => v.first().map(|r| r.to_f64()),
                _ => None,
            })
            .map(|mm| format!("{mm:.1} mm")),
        focal_length_35mm: exif
            .get_field(Tag::FocalLengthIn35mmFilm, In::PRIMARY)
            .and_then(|f| f.value.get_uint(0))
            .map(|mm| format!("{mm} mm")),
        composite_focal_length_35mm: None,
    }
}

fn ascii_field(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    let Value::Ascii(values) = &field.value else {
        return None;
    };
    let text = String::from_utf8_lossy(values.first()?);
    let text = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    use exif::experimental::Writer;
    use exif::{Field, Rational};
    use std::io::Cursor;

    fn ascii(tag: Tag, text: &str) -> Field {
        Field {
            tag,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![text.as_bytes().to_vec()]),
        }
    }

    /// SOI, an APP1 Exif segment holding `fields`, EOI.
    fn jpeg_with_exif(fields: &[Field]) -> Vec<u8> {
        let mut writer = Writer::new();
        for field in fields {
            writer.push_field(field);
        }
        let mut tiff = Cursor::new(Vec::new());
        writer.write(&mut tiff, false).unwrap();
        let tiff = tiff.into_inner();

        let mut jpeg = vec![0xff, 0xd8, 0xff, 0xe1];
        jpeg.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
        jpeg.extend_from_slice(b"Exif\0\0");
        jpeg.extend_from_slice(&tiff);
        jpeg.extend_from_slice(&[0xff, 0xd9]);
        jpeg
    }

    #[test]
    fn test_reads_focal_tags() {
        let fields = [
            ascii(Tag::Make, "FUJIFILM"),
            ascii(Tag::Model, "X-T5"),
            Field {
                tag: Tag::FocalLength,
                ifd_num: In::PRIMARY,
                value: Value::Rational(vec![Rational { num: 23, denom: 1 }]),
            },
            Field {
                tag: Tag::FocalLengthIn35mmFilm,
                ifd_num: In::PRIMARY,
                value: Value::Short(vec![35]),
            },
        ];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("DSCF0001.JPG");
        std::fs::write(&path, jpeg_with_exif(&fields)).unwrap();

        let rec = NativeExif.extract(&path).unwrap();
        assert_eq!(rec.make.as_deref(), Some("FUJIFILM"));
        assert_eq!(rec.model.as_deref(), Some("X-T5"));
        assert_eq!(rec.focal_length.as_deref(), Some("23.0 mm"));
        assert_eq!(rec.focal_length_35mm.as_deref(), Some("35 mm"));
        assert_eq!(rec.composite_focal_length_35mm, None);
    }

    #[test]
    fn test_missing_tags_are_absent() {
        let fields = [ascii(Tag::Make, "Apple")];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IMG_0001.jpg");
        std::fs::write(&path, jpeg_with_exif(&fields)).unwrap();

        let rec = NativeExif.extract(&path).unwrap();
        assert_eq!(rec.make.as_deref(), Some("Apple"));
        assert_eq!(rec.model, None);
        assert_eq!(rec.focal_length, None);
        assert_eq!(rec.focal_length_35mm, None);
    }

    #[test]
    fn test_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"not a jpeg").unwrap();

        let err = NativeExif.extract(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::Exif { .. }));

        let err = NativeExif.extract(&dir.path().join("missing.jpg")).unwrap_err();
        assert!(matches!(err, ExtractionError::Io { .. }));
    }
}
