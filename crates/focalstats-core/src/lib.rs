pub mod camera;
pub mod error;
pub mod extract;
pub mod focal;
pub mod report;
pub mod scan;

use std::path::PathBuf;

use ab_glyph::FontArc;
use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use error::{ExtractionError, ScanError};
pub use extract::{ExifTool, MetadataRecord, MetadataSource, NativeExif};
pub use report::ReportPaths;
pub use scan::Histograms;

fn default_exiftool() -> PathBuf {
    PathBuf::from("exiftool")
}

/// How metadata is read from each photo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Spawn exiftool per file
    #[default]
    Exiftool,
    /// Read EXIF in-process (no composite tags)
    Native,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeOptions {
    /// Folder scanned recursively; reports are written here too
    pub folder: PathBuf,
    #[serde(default = "default_exiftool")]
    pub exiftool: PathBuf,
    #[serde(default)]
    pub backend: Backend,
    /// TrueType font for chart labels; system fonts are tried when unset
    #[serde(default)]
    pub font: Option<PathBuf>,
}

impl AnalyzeOptions {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            exiftool: default_exiftool(),
            backend: Backend::default(),
            font: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub files_found: u64,
    /// Files that produced a 35mm-equivalent value
    pub files_with_focal: u64,
    pub files_skipped: u64,
    pub distinct_focal_lengths: u64,
    pub outputs: ReportPaths,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Type alias for progress callback: (stage, current, total, message)
pub type ProgressCallback<'a> = dyn Fn(&str, u64, u64, &str) + Send + Sync + 'a;

/// Run the full scan and write the reports.
pub fn analyze(
    options: &AnalyzeOptions,
    progress_callback: &ProgressCallback<'_>,
) -> anyhow::Result<AnalysisResult> {
    if !options.folder.is_dir() {
        return Err(ScanError::NotADirectory(options.folder.clone()).into());
    }

    let source: Box<dyn MetadataSource> = match options.backend {
        Backend::Exiftool => {
            let tool = ExifTool::new(&options.exiftool);
            if !tool.is_available() {
                anyhow::bail!(
                    "exiftool not found (tried `{}`); install it or pass --backend native",
                    options.exiftool.display()
                );
            }
            Box::new(tool)
        }
        Backend::Native => Box::new(NativeExif),
    };

    let today = chrono::Local::now().date_naive();
    analyze_with_source(options, &*source, today, progress_callback)
}

/// Same as [`analyze`] with an injected metadata source and chart date.
pub fn analyze_with_source(
    options: &AnalyzeOptions,
    source: &dyn MetadataSource,
    date: NaiveDate,
    progress_callback: &ProgressCallback<'_>,
) -> anyhow::Result<AnalysisResult> {
    if !options.folder.is_dir() {
        return Err(ScanError::NotADirectory(options.folder.clone()).into());
    }

    let mut warnings = Vec::new();

    // Resolve the font before scanning so a bad --font fails without output
    let font = resolve_font(options, &mut warnings)?;

    let outcome = scan::scan(&options.folder, source, progress_callback)?;

    progress_callback("report", 0, 1, "writing reports");
    let outputs = report::write_reports(&options.folder, &outcome.histograms, date, font.as_ref())?;

    warnings.extend(
        outcome
            .skipped
            .iter()
            .map(|s| format!("skipped {}: {}", s.path.display(), s.reason)),
    );

    Ok(AnalysisResult {
        files_found: outcome.files_found,
        files_with_focal: outcome.histograms.total_frames(),
        files_skipped: outcome.skipped.len() as u64,
        distinct_focal_lengths: outcome.histograms.overall.len() as u64,
        outputs,
        warnings,
    })
}

fn resolve_font(options: &AnalyzeOptions, warnings: &mut Vec<String>) -> anyhow::Result<Option<FontArc>> {
    if let Some(path) = &options.font {
        let font = report::chart::load_font(path)
            .with_context(|| format!("loading font {}", path.display()))?;
        return Ok(Some(font));
    }

    match report::chart::find_system_font() {
        Some((path, font)) => {
            log::debug!("chart font: {}", path.display());
            Ok(Some(font))
        }
        None => {
            let msg = "no TrueType font found, chart will have no labels (use --font)".to_string();
            log::warn!("{msg}");
            warnings.push(msg);
            Ok(None)
        }
    }
}
