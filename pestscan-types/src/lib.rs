use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Side length, in pixels, of the square frame every scan is resized to.
pub const FRAME_SIZE: u32 = 600;

/// Three-level grade of how badly a plant is affected.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Treatment {
    pub organic: String,
    pub chemical: String,
}

/// Treatment advice keyed by severity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Treatments {
    pub low: Treatment,
    pub medium: Treatment,
    pub high: Treatment,
}

impl Treatments {
    pub fn for_severity(&self, severity: Severity) -> &Treatment {
        match severity {
            Severity::Low => &self.low,
            Severity::Medium => &self.medium,
            Severity::High => &self.high,
        }
    }
}

/// A pest or disease the detector can recognise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pest {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub treatments: Treatments,
    pub confidence: u32,
}

/// Local agricultural-supply retailer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Agrovet {
    pub id: u64,
    pub name: String,
    pub location: String,
    pub contact: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// GeoJSON position: `[longitude, latitude]`, optionally followed by altitude.
pub type Position = Vec<f64>;

/// Typed view of a farm boundary. Members beyond `type` and `coordinates`
/// (`bbox`, foreign members) are ignored when parsing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
}

impl Geometry {
    /// Parse a raw GeoJSON geometry without consuming it.
    pub fn from_json(raw: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Geometry::deserialize(raw)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Farm {
    pub id: u64,
    pub name: String,
    /// GeoJSON geometry, kept verbatim.
    pub boundaries: serde_json::Value,
    /// Square metres.
    pub area: f64,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

/// Farm fields supplied by the client; id and creation time are assigned by the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewFarm {
    pub name: String,
    pub boundaries: serde_json::Value,
    pub area: f64,
    pub location: String,
}

impl NewFarm {
    pub fn geometry(&self) -> Result<Geometry, serde_json::Error> {
        Geometry::from_json(&self.boundaries)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexSample {
    pub date: String,
    pub value: f64,
}

/// Time series of the four vegetation indices tracked per crop.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CropIndices {
    pub ndvi: Vec<IndexSample>,
    pub msavi: Vec<IndexSample>,
    pub reci: Vec<IndexSample>,
    pub ndmi: Vec<IndexSample>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crop {
    pub id: u64,
    pub farm_id: u64,
    pub name: String,
    pub planting_date: DateTime<Utc>,
    pub indices: CropIndices,
    #[serde(default)]
    pub soil_data: Option<serde_json::Value>,
}

/// Crop fields supplied by the client; the farm id comes from the request path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCrop {
    pub name: String,
    pub planting_date: DateTime<Utc>,
    pub indices: CropIndices,
    #[serde(default)]
    pub soil_data: Option<serde_json::Value>,
}

/// Axis-aligned box in pixel coordinates of the 600x600 frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }
}

/// One detection produced by a scan. Never stored server-side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub name: String,
    /// 0-100.
    pub confidence: u8,
    pub description: String,
    pub severity: Severity,
    pub bounding_box: BoundingBox,
}

impl DetectionResult {
    pub fn label(&self) -> String {
        format!("{} ({}%)", self.name, self.confidence)
    }
}

/// Output of one scan, as kept in the client's session file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub scan_id: Uuid,
    pub scanned_at: DateTime<Utc>,
    pub results: Vec<DetectionResult>,
}

/// Snapshot of vegetation health indices for a farm.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VegetationIndices {
    pub ndvi: f64,
    pub msavi: f64,
    pub reci: f64,
    pub ndmi: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherForecast {
    pub date: NaiveDate,
    pub temperature: TemperatureRange,
    /// Percent.
    pub humidity: u8,
    /// Millimetres.
    pub rainfall: f64,
    /// km/h.
    pub wind_speed: f64,
}
