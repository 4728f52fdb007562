use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::camera;
use crate::error::ScanError;
use crate::extract::{MetadataRecord, MetadataSource};
use crate::focal;
use crate::ProgressCallback;

/// Lowercase extensions of the images we read.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "heic", "heif"];

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e.as_str()))
}

/// Recursively collect supported images under `root`, sorted by path.
pub fn discover_images(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(ScanError::Io {
                    path: root.to_path_buf(),
                    source: e,
                })
            }
            Err(e) => {
                log::warn!("skipping unreadable entry: {e}");
                continue;
            }
        };
        // path().is_file() follows symlinks to photos elsewhere
        if entry.path().is_file() && is_supported_image(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// What one photo contributes to the statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub camera: String,
    pub native_mm: Option<u32>,
    pub equivalent_mm: Option<u32>,
}

impl Observation {
    pub fn from_record(record: &MetadataRecord) -> Self {
        let native = focal::native_focal_length(record);
        let equivalent = focal::equivalent_focal_length(record, native);
        Self {
            camera: camera::record_camera_label(record),
            native_mm: native.map(focal::round_mm),
            equivalent_mm: equivalent.map(|e| focal::round_mm(e.mm)),
        }
    }
}

/// Frequency tables built during a scan. Keys only ever gain counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Histograms {
    /// 35mm-equivalent mm -> frames
    pub overall: BTreeMap<u32, u64>,
    /// (camera, native mm, 35mm-equivalent mm) -> frames
    pub per_camera: BTreeMap<(String, u32, u32), u64>,
}

impl Histograms {
    pub fn record(&mut self, obs: &Observation) {
        let Some(eq) = obs.equivalent_mm else {
            return;
        };
        *self.overall.entry(eq).or_default() += 1;

        if let Some(native) = obs.native_mm {
            *self
                .per_camera
                .entry((obs.camera.clone(), native, eq))
                .or_default() += 1;
        }
    }

    /// Number of frames that had a 35mm-equivalent value.
    pub fn total_frames(&self) -> u64 {
        self.overall.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.overall.is_empty()
    }
}

/// A file whose metadata could not be read.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub histograms: Histograms,
    pub files_found: u64,
    pub skipped: Vec<SkippedFile>,
}

/// Walk `root`, read every supported image through `source`, and count
/// focal lengths. Single pass, one file at a time.
pub fn scan(
    root: &Path,
    source: &dyn MetadataSource,
    progress: &ProgressCallback<'_>,
) -> Result<ScanOutcome, ScanError> {
    let files = discover_images(root)?;
    if files.is_empty() {
        return Err(ScanError::NoSupportedImages(root.to_path_buf()));
    }

    let total = files.len() as u64;
    let mut histograms = Histograms::default();
    let mut skipped = Vec::new();

    for (i, path) in files.iter().enumerate() {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        progress("scan", i as u64 + 1, total, name);

        let record = match source.extract(path) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("skipping {}: {e}", path.display());
                skipped.push(SkippedFile {
                    path: path.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let obs = Observation::from_record(&record);
        log::debug!("{}: {obs:?}", path.display());
        histograms.record(&obs);
    }

    if histograms.is_empty() {
        return Err(ScanError::NoFocalData);
    }

    Ok(ScanOutcome {
        histograms,
        files_found: total,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_image(Path::new("a/IMG_0001.JPG")));
        assert!(is_supported_image(Path::new("b.jpeg")));
        assert!(is_supported_image(Path::new("c.HEIC")));
        assert!(is_supported_image(Path::new("d.heif")));
        assert!(!is_supported_image(Path::new("e.png")));
        assert!(!is_supported_image(Path::new("f.RAF")));
        assert!(!is_supported_image(Path::new("jpg")));
    }

    #[test]
    fn test_discover_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("2024").join("trip");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("b.JPG"), b"").unwrap();
        fs::write(nested.join("a.heic"), b"").unwrap();
        fs::write(nested.join("notes.txt"), b"").unwrap();
        fs::create_dir_all(dir.path().join("folder.jpg")).unwrap();

        let files = discover_images(dir.path()).unwrap();
        assert_eq!(files, vec![nested.join("a.heic"), dir.path().join("b.JPG")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_follows_file_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let library = dir.path().join("library");
        let albums = dir.path().join("albums");
        fs::create_dir_all(&library).unwrap();
        fs::create_dir_all(&albums).unwrap();
        fs::write(library.join("a.jpg"), b"").unwrap();
        std::os::unix::fs::symlink(library.join("a.jpg"), albums.join("b.jpg")).unwrap();
        // Dangling links are not photos
        std::os::unix::fs::symlink(library.join("gone.jpg"), albums.join("c.jpg")).unwrap();

        let files = discover_images(dir.path()).unwrap();
        assert_eq!(files, vec![albums.join("b.jpg"), library.join("a.jpg")]);
    }

    #[test]
    fn test_discover_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.jpg");
        fs::write(&file, b"").unwrap();

        assert!(matches!(discover_images(&file), Err(ScanError::NotADirectory(_))));
        assert!(matches!(
            discover_images(&dir.path().join("missing")),
            Err(ScanError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_histograms_record() {
        let mut h = Histograms::default();
        let obs = |native, eq| Observation {
            camera: "XT5".to_string(),
            native_mm: native,
            equivalent_mm: eq,
        };
        h.record(&obs(Some(23), Some(35)));
        h.record(&obs(Some(23), Some(35)));
        h.record(&obs(None, Some(50)));
        h.record(&obs(Some(23), None));
        h.record(&obs(None, None));

        assert_eq!(h.overall, BTreeMap::from([(35, 2), (50, 1)]));
        assert_eq!(
            h.per_camera,
            BTreeMap::from([(("XT5".to_string(), 23, 35), 2)])
        );
        assert_eq!(h.total_frames(), 3);
    }
}
