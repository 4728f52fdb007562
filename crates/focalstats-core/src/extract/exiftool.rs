use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use super::{MetadataRecord, MetadataSource};
use crate::error::ExtractionError;

/// Tags requested from exiftool, in the order its output lines come back.
const TAGS: &[&str] = &[
    "-Make",
    "-Model",
    "-FocalLength",
    "-FocalLengthIn35mmFormat",
    "-Composite:FocalLength35mm",
];

/// Reads metadata by spawning exiftool once per file.
#[derive(Debug, Clone)]
pub struct ExifTool {
    program: OsString,
}

impl Default for ExifTool {
    fn default() -> Self {
        Self::new("exiftool")
    }
}

impl ExifTool {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check whether the configured program runs at all.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("-ver")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn command(&self, path: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        // -s3: values only, -f: print "-" for missing tags so lines stay aligned
        cmd.arg("-s3").arg("-f").args(TAGS).arg(path);
        cmd
    }
}

impl MetadataSource for ExifTool {
    fn extract(&self, path: &Path) -> Result<MetadataRecord, ExtractionError> {
        let output = self
            .command(path)
            .output()
            .map_err(|source| ExtractionError::ToolNotFound {
                program: self.program.to_string_lossy().into_owned(),
                source,
            })?;

        if !output.status.success() {
            return Err(ExtractionError::ToolFailed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(MetadataRecord::from_tool_output(&String::from_utf8_lossy(
            &output.stdout,
        )))
    }
}
