use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use pestscan_types::ScanReport;

/// Where the last scan's results live between `scan` and `results`.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: Option<PathBuf>) -> Self {
        let path = path.unwrap_or_else(|| std::env::temp_dir().join("pestscan-scan-results.json"));
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, report: &ScanReport) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// `None` when no scan has been stored yet.
    pub fn load(&self) -> anyhow::Result<Option<ScanReport>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pestscan_types::{BoundingBox, DetectionResult, Severity};
    use uuid::Uuid;

    #[test]
    fn report_survives_save_and_load() {
        let path = std::env::temp_dir().join(format!("pestscan_session_{}.json", std::process::id()));
        let _ = fs::remove_file(&path);
        let store = SessionStore::new(Some(path.clone()));
        assert!(store.load().unwrap().is_none());

        let report = ScanReport {
            scan_id: Uuid::new_v4(),
            scanned_at: Utc::now(),
            results: vec![DetectionResult {
                name: "Fall Armyworm".into(),
                confidence: 95,
                description: "Common pest affecting maize crops".into(),
                severity: Severity::Low,
                bounding_box: BoundingBox { x1: 100.0, y1: 100.0, x2: 200.0, y2: 200.0 },
            }],
        };
        store.save(&report).unwrap();
        let loaded = store.load().unwrap().unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded.results, report.results);
        assert_eq!(loaded.scan_id, report.scan_id);
    }
}
