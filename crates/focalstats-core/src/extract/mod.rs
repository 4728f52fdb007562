pub mod exiftool;
pub mod native;

use std::path::Path;

pub use exiftool::ExifTool;
pub use native::NativeExif;

use crate::error::ExtractionError;

/// Raw focal-length related tags for one file, as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    pub make: Option<String>,
    pub model: Option<String>,
    /// Camera-reported focal length, e.g. "23.0 mm"
    pub focal_length: Option<String>,
    /// FocalLengthIn35mmFormat tag
    pub focal_length_35mm: Option<String>,
    /// exiftool's computed Composite:FocalLength35mm
    pub composite_focal_length_35mm: Option<String>,
}

impl MetadataRecord {
    /// Parse `exiftool -s3 -f` output: one line per requested tag, in the
    /// order Make, Model, FocalLength, FocalLengthIn35mmFormat,
    /// Composite:FocalLength35mm.
    ///
    /// Missing lines, blank lines and the `-` placeholder are absent fields.
    pub fn from_tool_output(output: &str) -> Self {
        let mut lines = output.lines().map(|line| {
            let value = line.trim();
            if value.is_empty() || value == "-" {
                None
            } else {
                Some(value.to_string())
            }
        });
        let mut next = || lines.next().flatten();

        Self {
            make: next(),
            model: next(),
            focal_length: next(),
            focal_length_35mm: next(),
            composite_focal_length_35mm: next(),
        }
    }

    pub fn make(&self) -> &str {
        self.make.as_deref().unwrap_or("")
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or("")
    }
}

/// Anything that can turn an image path into a [`MetadataRecord`].
pub trait MetadataSource {
    fn extract(&self, path: &Path) -> Result<MetadataRecord, ExtractionError>;
}

impl<S: MetadataSource + ?Sized> MetadataSource for &S {
    fn extract(&self, path: &Path) -> Result<MetadataRecord, ExtractionError> {
        (**self).extract(path)
    }
}

impl<S: MetadataSource + ?Sized> MetadataSource for Box<S> {
    fn extract(&self, path: &Path) -> Result<MetadataRecord, ExtractionError> {
        (**self).extract(path)
    }
}
