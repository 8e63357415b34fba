use async_trait::async_trait;
use thiserror::Error;

pub mod tensor;
pub use tensor::{decode_data_url, decode_image, preprocess, ImageTensor};

#[derive(Debug, Error)]
pub enum InferError {
    #[error("image decode failed: {0}")]
    Decode(String),
    #[error("preprocessing failed: {0}")]
    Preprocess(String),
    #[error("model failed: {0}")]
    Model(String),
}

/// Raw detector output, one entry per candidate box.
///
/// Boxes are `[x1, y1, x2, y2]` in pixels of the model input frame, scores are
/// in `[0, 1]`, and classes index into the pest catalog (1-based pest ids).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawPredictions {
    pub boxes: Vec<[f32; 4]>,
    pub scores: Vec<f32>,
    pub classes: Vec<u32>,
}

impl RawPredictions {
    pub fn len(&self) -> usize {
        self.boxes.len().min(self.scores.len()).min(self.classes.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Capability boundary for the image classifier.
#[async_trait]
pub trait DetectionModel: Send + Sync {
    async fn predict(&self, input: &ImageTensor) -> Result<RawPredictions, InferError>;
}

/// Placeholder detector: always reports one Fall Armyworm box at 95%.
pub struct StubDetectionModel;

#[async_trait]
impl DetectionModel for StubDetectionModel {
    async fn predict(&self, _input: &ImageTensor) -> Result<RawPredictions, InferError> {
        Ok(RawPredictions {
            boxes: vec![[100.0, 100.0, 200.0, 200.0]],
            scores: vec![0.95],
            classes: vec![1],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_reports_single_box() {
        let input = ImageTensor::zeros();
        let out = StubDetectionModel.predict(&input).await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.boxes[0], [100.0, 100.0, 200.0, 200.0]);
        assert_eq!(out.classes[0], 1);
    }

    #[test]
    fn ragged_predictions_use_shortest_column() {
        let p = RawPredictions {
            boxes: vec![[0.0; 4], [0.0; 4]],
            scores: vec![0.5],
            classes: vec![1, 2],
        };
        assert_eq!(p.len(), 1);
        assert!(RawPredictions::default().is_empty());
    }
}
