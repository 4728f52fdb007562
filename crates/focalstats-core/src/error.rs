use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Failure to read metadata for a single file. Never fatal to a scan.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("metadata tool `{program}` could not be started")]
    ToolNotFound {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("metadata tool exited with {status}: {stderr}")]
    ToolFailed { status: ExitStatus, stderr: String },

    #[error("could not read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no readable EXIF in {}: {}", .path.display(), .source)]
    Exif {
        path: PathBuf,
        #[source]
        source: exif::Error,
    },
}

/// Failures that end a scan before any output is written.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Folder not found: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("No supported images found in {}", .0.display())]
    NoSupportedImages(PathBuf),

    #[error("No focal-length data found (tags missing).")]
    NoFocalData,

    #[error("could not walk {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}
