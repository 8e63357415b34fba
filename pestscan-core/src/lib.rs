use std::sync::Arc;

use chrono::Utc;
use image::DynamicImage;
use pestscan_infer::{decode_data_url, decode_image, preprocess, DetectionModel, InferError, RawPredictions};
use pestscan_types::{BoundingBox, DetectionResult, Pest, ScanReport};
use thiserror::Error;
use uuid::Uuid;

pub mod advice;
pub use advice::{recommend, Recommendation, TREATMENT_GUIDELINES};

pub mod overlay;
pub use overlay::{AnnotationFormat, Overlay, OverlayBox};

pub mod severity;
pub use severity::{affected_area_percent, classify_severity, severity_for};

/// What the user sees when a scan cannot complete. The underlying cause is
/// kept as the error source for logging.
#[derive(Debug, Error)]
#[error("Detection failed. Please try again or use a different image")]
pub struct DetectError {
    #[from]
    pub cause: InferError,
}

/// The detection pipeline: decode, preprocess, infer, grade.
pub struct DetectionPipeline {
    pub model: Arc<dyn DetectionModel>,
    /// Pests the model's class ids refer to (class id == pest id).
    pub catalog: Vec<Pest>,
}

impl DetectionPipeline {
    pub fn new(model: Arc<dyn DetectionModel>, catalog: Vec<Pest>) -> Self {
        Self { model, catalog }
    }

    /// Run one image through the model and grade every detection.
    ///
    /// Box coordinates in the results are relative to the 600x600 model frame.
    pub async fn detect(&self, img: &DynamicImage) -> Result<Vec<DetectionResult>, DetectError> {
        let tensor = preprocess(img)?;
        let predictions = self.model.predict(&tensor).await?;
        Ok(self.grade(&predictions))
    }

    pub async fn detect_bytes(&self, bytes: &[u8]) -> Result<Vec<DetectionResult>, DetectError> {
        let img = decode_image(bytes)?;
        self.detect(&img).await
    }

    pub async fn detect_data_url(&self, url: &str) -> Result<Vec<DetectionResult>, DetectError> {
        let img = decode_data_url(url)?;
        self.detect(&img).await
    }

    /// `detect`, stamped with a fresh scan id and time.
    pub async fn scan(&self, img: &DynamicImage) -> Result<ScanReport, DetectError> {
        let results = self.detect(img).await?;
        Ok(ScanReport {
            scan_id: Uuid::new_v4(),
            scanned_at: Utc::now(),
            results,
        })
    }

    fn grade(&self, predictions: &RawPredictions) -> Vec<DetectionResult> {
        (0..predictions.len())
            .map(|i| {
                let [x1, y1, x2, y2] = predictions.boxes[i];
                let bounding_box = BoundingBox { x1, y1, x2, y2 };
                let confidence = (predictions.scores[i] * 100.0).round().clamp(0.0, 100.0) as u8;
                let class = predictions.classes[i];

                let (name, description) = match self.catalog.iter().find(|p| p.id == class as u64) {
                    Some(p) => (p.name.clone(), p.description.clone()),
                    None => {
                        tracing::warn!(class, "model returned a class with no catalog entry");
                        (format!("Unknown class {class}"), String::new())
                    }
                };

                DetectionResult {
                    name,
                    confidence,
                    description,
                    severity: severity_for(confidence, &bounding_box),
                    bounding_box,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::{Rgb, RgbImage};
    use pestscan_infer::{ImageTensor, StubDetectionModel};
    use pestscan_types::{Severity, Treatment, Treatments};

    fn catalog() -> Vec<Pest> {
        let t = || Treatment {
            organic: "o".into(),
            chemical: "c".into(),
        };
        vec![
            Pest {
                id: 1,
                name: "Fall Armyworm".into(),
                description: "Common pest affecting maize crops".into(),
                treatments: Treatments { low: t(), medium: t(), high: t() },
                confidence: 90,
            },
            Pest {
                id: 2,
                name: "Leaf Blight".into(),
                description: "Fungal disease affecting crop leaves".into(),
                treatments: Treatments { low: t(), medium: t(), high: t() },
                confidence: 85,
            },
        ]
    }

    fn leaf() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(320, 240, Rgb([40, 160, 60])))
    }

    struct FixedModel(RawPredictions);

    #[async_trait]
    impl DetectionModel for FixedModel {
        async fn predict(&self, _input: &ImageTensor) -> Result<RawPredictions, InferError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenModel;

    #[async_trait]
    impl DetectionModel for BrokenModel {
        async fn predict(&self, _input: &ImageTensor) -> Result<RawPredictions, InferError> {
            Err(InferError::Model("weights missing".into()))
        }
    }

    #[tokio::test]
    async fn stub_model_yields_graded_armyworm() {
        let pipeline = DetectionPipeline::new(Arc::new(StubDetectionModel), catalog());
        let results = pipeline.detect(&leaf()).await.unwrap();
        assert_eq!(results.len(), 1);
        let r = &results[0];
        assert_eq!(r.name, "Fall Armyworm");
        assert_eq!(r.confidence, 95);
        assert_eq!(r.description, "Common pest affecting maize crops");
        assert_eq!(r.severity, Severity::Low);
        assert_eq!(r.bounding_box, BoundingBox { x1: 100.0, y1: 100.0, x2: 200.0, y2: 200.0 });
    }

    #[tokio::test]
    async fn every_box_is_graded_on_its_own() {
        let model = FixedModel(RawPredictions {
            boxes: vec![[0.0, 0.0, 400.0, 400.0], [0.0, 0.0, 250.0, 250.0], [0.0, 0.0, 50.0, 50.0]],
            scores: vec![0.91, 0.8, 0.99],
            classes: vec![2, 1, 7],
        });
        let pipeline = DetectionPipeline::new(Arc::new(model), catalog());
        let results = pipeline.detect(&leaf()).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].name, "Leaf Blight");
        assert_eq!(results[0].severity, Severity::High);
        assert_eq!(results[1].severity, Severity::Medium);
        assert_eq!(results[2].name, "Unknown class 7");
        assert_eq!(results[2].severity, Severity::Low);
    }

    #[tokio::test]
    async fn model_failure_is_generic_detect_error() {
        let pipeline = DetectionPipeline::new(Arc::new(BrokenModel), catalog());
        let err = pipeline.detect(&leaf()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Detection failed. Please try again or use a different image"
        );
        assert!(matches!(err.cause, InferError::Model(_)));
    }

    #[tokio::test]
    async fn empty_image_is_generic_detect_error() {
        let pipeline = DetectionPipeline::new(Arc::new(StubDetectionModel), catalog());
        let empty = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        let err = pipeline.detect(&empty).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Detection failed. Please try again or use a different image"
        );
        assert!(matches!(err.cause, InferError::Preprocess(_)));
    }

    #[tokio::test]
    async fn undecodable_bytes_fail_the_scan() {
        let pipeline = DetectionPipeline::new(Arc::new(StubDetectionModel), catalog());
        let err = pipeline.detect_bytes(b"\x00\x01garbage").await.unwrap_err();
        assert!(matches!(err.cause, InferError::Decode(_)));
    }

    #[tokio::test]
    async fn scan_report_is_stamped() {
        let pipeline = DetectionPipeline::new(Arc::new(StubDetectionModel), catalog());
        let a = pipeline.scan(&leaf()).await.unwrap();
        let b = pipeline.scan(&leaf()).await.unwrap();
        assert_ne!(a.scan_id, b.scan_id);
        assert_eq!(a.results, b.results);
    }
}
