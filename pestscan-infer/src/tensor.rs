use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::imageops::{self, FilterType};
use image::DynamicImage;
use pestscan_types::FRAME_SIZE;

use crate::InferError;

/// Normalised NHWC float tensor, shape `[1, 600, 600, 3]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageTensor {
    pub shape: [usize; 4],
    pub data: Vec<f32>,
}

impl ImageTensor {
    /// Black frame; handy for exercising models without an image.
    pub fn zeros() -> Self {
        let side = FRAME_SIZE as usize;
        Self {
            shape: [1, side, side, 3],
            data: vec![0.0; side * side * 3],
        }
    }

    /// Value at batch 0 for pixel `(x, y)` and channel `c`.
    pub fn at(&self, x: usize, y: usize, c: usize) -> Option<f32> {
        let [_, h, w, ch] = self.shape;
        if x >= w || y >= h || c >= ch {
            return None;
        }
        self.data.get((y * w + x) * ch + c).copied()
    }
}

pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, InferError> {
    image::load_from_memory(bytes).map_err(|e| InferError::Decode(e.to_string()))
}

/// Decode a `data:image/...;base64,` URL such as a camera capture produces.
pub fn decode_data_url(url: &str) -> Result<DynamicImage, InferError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| InferError::Decode("not a data url".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| InferError::Decode("data url has no payload".into()))?;
    if !meta.ends_with(";base64") {
        return Err(InferError::Decode("data url is not base64 encoded".into()));
    }
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| InferError::Decode(e.to_string()))?;
    decode_image(&bytes)
}

/// Resize to the detector frame (bilinear), scale channels to `[0, 1]` and add
/// the batch axis.
pub fn preprocess(img: &DynamicImage) -> Result<ImageTensor, InferError> {
    if img.width() == 0 || img.height() == 0 {
        return Err(InferError::Preprocess("empty image".into()));
    }
    let rgb = img.to_rgb8();
    let resized = imageops::resize(&rgb, FRAME_SIZE, FRAME_SIZE, FilterType::Triangle);
    let data: Vec<f32> = resized.as_raw().iter().map(|&v| v as f32 / 255.0).collect();
    let side = FRAME_SIZE as usize;
    Ok(ImageTensor {
        shape: [1, side, side, 3],
        data,
    })
}
