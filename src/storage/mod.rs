mod collection;

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use utoipa::ToSchema;

pub use collection::{JsonCollection, RecordStore};

use crate::records::{TelemetryRecord, WaypointRecord};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),
}

/// A generated report as listed for download.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReportEntry {
    pub filename: String,
    pub timestamp: String,
    pub size_bytes: u64,
    pub created: DateTime<Utc>,
    pub url: String,
}

/// On-disk layout of the rover data:
///
/// ```text
/// <base>/metadata.json   telemetry records
/// <base>/waypoints.json  waypoint records
/// <base>/images/         captured photos
/// <base>/reports/        generated reports and maps
/// ```
pub struct Storage {
    base: PathBuf,
    pub telemetry: JsonCollection<TelemetryRecord>,
    pub waypoints: JsonCollection<WaypointRecord>,
}

impl Storage {
    pub fn new(base: PathBuf) -> Self {
        Storage {
            telemetry: JsonCollection::new(base.join("metadata.json")),
            waypoints: JsonCollection::new(base.join("waypoints.json")),
            base,
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn images_dir(&self) -> PathBuf {
        self.base.join("images")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.base.join("reports")
    }

    pub fn ensure_layout(&self) -> Result<(), StorageError> {
        std::fs::create_dir_all(self.images_dir())?;
        std::fs::create_dir_all(self.reports_dir())?;
        Ok(())
    }

    /// Writes an uploaded photo and returns its size in bytes.
    pub fn save_image(&self, filename: &str, bytes: &[u8]) -> Result<u64, StorageError> {
        std::fs::create_dir_all(self.images_dir())?;
        let path = self.image_path(filename);
        std::fs::write(&path, bytes)?;
        info!("Saved image {} ({} bytes)", path.display(), bytes.len());
        Ok(std::fs::metadata(&path)?.len())
    }

    pub fn image_path(&self, filename: &str) -> PathBuf {
        self.images_dir().join(filename)
    }

    pub fn save_report(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, StorageError> {
        std::fs::create_dir_all(self.reports_dir())?;
        let path = self.reports_dir().join(filename);
        std::fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Resolves a downloadable report, rejecting anything but `report_*.html|pdf`.
    pub fn report_path(&self, filename: &str) -> Result<PathBuf, StorageError> {
        let allowed = filename.starts_with("report_")
            && (filename.ends_with(".html") || filename.ends_with(".pdf"))
            && !filename.contains(['/', '\\'])
            && !filename.contains("..");
        if !allowed {
            return Err(StorageError::InvalidFilename(filename.to_string()));
        }

        let path = self.reports_dir().join(filename);
        if !path.is_file() {
            return Err(StorageError::NotFound(filename.to_string()));
        }
        Ok(path)
    }

    /// HTML reports, newest first.
    pub fn list_reports(&self) -> Result<Vec<ReportEntry>, StorageError> {
        let dir = self.reports_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut reports = Vec::new();
        for entry in dir.read_dir()? {
            let entry = entry?;
            let filename = entry.file_name().to_string_lossy().into_owned();
            if !filename.starts_with("report_") || !filename.ends_with(".html") {
                continue;
            }

            let meta = match entry.metadata() {
                Ok(meta) => meta,
                Err(e) => {
                    warn!("Failed to stat report {}: {}", filename, e);
                    continue;
                }
            };
            let created = meta.created().or_else(|_| meta.modified())?;

            reports.push(ReportEntry {
                timestamp: filename
                    .trim_start_matches("report_")
                    .trim_end_matches(".html")
                    .to_string(),
                size_bytes: meta.len(),
                created: DateTime::<Utc>::from(created),
                url: format!("/api/report/download/{}", filename),
                filename,
            });
        }

        reports.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_path_validation() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        storage
            .save_report("report_20240101_120000.html", b"<html></html>")
            .unwrap();

        assert!(storage.report_path("report_20240101_120000.html").is_ok());
        assert!(matches!(
            storage.report_path("report_20240101_130000.pdf"),
            Err(StorageError::NotFound(_))
        ));
        for bad in ["map_20240101.html", "report_x.txt", "report_../../etc.html", "report_a/b.html"] {
            assert!(
                matches!(storage.report_path(bad), Err(StorageError::InvalidFilename(_))),
                "{bad} accepted"
            );
        }
    }

    #[test]
    fn test_list_reports_only_html_reports() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        storage.save_report("report_1.html", b"a").unwrap();
        storage.save_report("report_1.pdf", b"b").unwrap();
        storage.save_report("map_1.html", b"c").unwrap();

        let reports = storage.list_reports().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].filename, "report_1.html");
        assert_eq!(reports[0].timestamp, "1");
        assert_eq!(reports[0].size_bytes, 1);
        assert_eq!(reports[0].url, "/api/report/download/report_1.html");
    }

    #[test]
    fn test_save_image_returns_size() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        let size = storage.save_image("x.jpg", &[0u8; 42]).unwrap();
        assert_eq!(size, 42);
        assert!(storage.image_path("x.jpg").is_file());
    }
}
