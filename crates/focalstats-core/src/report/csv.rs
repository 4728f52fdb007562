use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::scan::Histograms;

const LINE_END: &str = "\r\n";

/// Quote a field only when it needs it, doubling embedded quotes.
fn field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn write_row<W: Write>(out: &mut W, fields: &[&str]) -> io::Result<()> {
    for (i, value) in fields.iter().enumerate() {
        if i > 0 {
            out.write_all(b",")?;
        }
        out.write_all(field(value).as_bytes())?;
    }
    out.write_all(LINE_END.as_bytes())
}

pub fn histogram_csv<W: Write>(out: &mut W, histograms: &Histograms) -> io::Result<()> {
    write_row(out, &["focal_mm_35eq", "count"])?;
    for (mm, count) in &histograms.overall {
        write_row(out, &[&mm.to_string(), &count.to_string()])?;
    }
    Ok(())
}

pub fn camera_usage_csv<W: Write>(out: &mut W, histograms: &Histograms) -> io::Result<()> {
    write_row(out, &["camera", "native_mm", "focal_mm_35eq", "count"])?;
    for ((camera, native, eq), count) in &histograms.per_camera {
        write_row(
            out,
            &[camera.as_str(), &native.to_string(), &eq.to_string(), &count.to_string()],
        )?;
    }
    Ok(())
}

/// Write the 35mm-equivalent histogram, ascending by focal length.
pub fn write_histogram_csv(path: &Path, histograms: &Histograms) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    histogram_csv(&mut out, histograms)?;
    out.flush()
}

/// Write per-camera usage, ascending by (camera, native, equivalent).
pub fn write_camera_usage_csv(path: &Path, histograms: &Histograms) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    camera_usage_csv(&mut out, histograms)?;
    out.flush()
}
