pub mod chart;
pub mod csv;

use std::path::{Path, PathBuf};

use ab_glyph::FontArc;
use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::scan::Histograms;

pub const HISTOGRAM_CSV: &str = "focal_length_histogram.csv";
pub const CAMERA_USAGE_CSV: &str = "camera_focal_usage.csv";
pub const HISTOGRAM_PNG: &str = "focal_length_histogram.png";

/// Where one run's outputs were written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPaths {
    pub histogram_csv: PathBuf,
    pub camera_usage_csv: PathBuf,
    pub chart_png: PathBuf,
}

impl ReportPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            histogram_csv: dir.join(HISTOGRAM_CSV),
            camera_usage_csv: dir.join(CAMERA_USAGE_CSV),
            chart_png: dir.join(HISTOGRAM_PNG),
        }
    }
}

/// Write both CSVs and the chart into `dir`, replacing earlier runs.
pub fn write_reports(
    dir: &Path,
    histograms: &Histograms,
    date: NaiveDate,
    font: Option<&FontArc>,
) -> anyhow::Result<ReportPaths> {
    let paths = ReportPaths::in_dir(dir);

    csv::write_histogram_csv(&paths.histogram_csv, histograms)
        .with_context(|| format!("writing {}", paths.histogram_csv.display()))?;
    csv::write_camera_usage_csv(&paths.camera_usage_csv, histograms)
        .with_context(|| format!("writing {}", paths.camera_usage_csv.display()))?;
    chart::write_chart(&paths.chart_png, &histograms.overall, date, font)
        .with_context(|| format!("writing {}", paths.chart_png.display()))?;

    log::info!("reports written to {}", dir.display());
    Ok(paths)
}
