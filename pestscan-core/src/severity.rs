use pestscan_types::{BoundingBox, Severity, FRAME_SIZE};

const FRAME_AREA: f64 = (FRAME_SIZE as f64) * (FRAME_SIZE as f64);

/// Share of the 600x600 frame covered by `bbox`, in percent.
pub fn affected_area_percent(bbox: &BoundingBox) -> f64 {
    let w = (bbox.width() as f64).max(0.0);
    let h = (bbox.height() as f64).max(0.0);
    w * h * 100.0 / FRAME_AREA
}

/// Grade a detection from its confidence (0-100) and affected area (percent).
///
/// Checked in order: either signal under the low bar gives `Low`, either under
/// the medium bar gives `Medium`, otherwise `High`.
pub fn classify_severity(confidence: f64, area_percent: f64) -> Severity {
    if confidence < 70.0 || area_percent < 10.0 {
        Severity::Low
    } else if confidence < 85.0 || area_percent < 25.0 {
        Severity::Medium
    } else {
        Severity::High
    }
}

pub fn severity_for(confidence: u8, bbox: &BoundingBox) -> Severity {
    classify_severity(confidence as f64, affected_area_percent(bbox))
}
