//! Frame anomaly check
//!
//! Uploaded frames are decoded to grayscale, area-resized to a fixed square
//! resolution and normalized to `[0,1]` before reconstruction. The frame is
//! anomalous when the mean squared reconstruction error is strictly above
//! [`ANOMALY_THRESHOLD`].

use super::models::ReconstructionModel;
use super::{DetectionError, DetectionResult};
use image::{DynamicImage, GrayImage, ImageReader, Limits, Luma};
use ndarray::{Array2, ArrayBase, ArrayView2, Data, Ix2};
use serde::Serialize;
use std::io::Cursor;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Side length of the model input
pub const FRAME_SIZE: usize = 128;

/// Reconstruction error above which a frame is anomalous
pub const ANOMALY_THRESHOLD: f64 = 0.0025;

/// Upload size limit (10 MB)
pub const MAX_FRAME_BYTES: usize = 10 * 1024 * 1024;

/// Largest accepted width or height of a decoded frame
pub const MAX_FRAME_DIMENSION: u32 = 8192;

/// Decoder allocation cap (256 MiB)
const MAX_DECODE_ALLOC: u64 = 256 * 1024 * 1024;

/// Accepted upload extensions, compared case-insensitively
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "bmp"];

/// Reasons an upload is rejected before analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameRejection {
    #[error("No file provided")]
    Missing,

    #[error("No file selected")]
    NoFilename,

    #[error("Invalid file type. Only images are allowed.")]
    InvalidType,

    #[error("File too large. Maximum size is 10MB.")]
    TooLarge,

    #[error("Invalid image file")]
    Undecodable,
}

/// Check the client-supplied filename
pub fn validate_upload_name(filename: &str) -> Result<(), FrameRejection> {
    if filename.is_empty() {
        return Err(FrameRejection::NoFilename);
    }

    match filename.rsplit_once('.') {
        Some((_, ext))
            if ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed)) =>
        {
            Ok(())
        }
        _ => Err(FrameRejection::InvalidType),
    }
}

/// Decode image bytes into a single-channel matrix.
///
/// Frames wider or taller than [`MAX_FRAME_DIMENSION`] are refused before
/// any pixel buffer is allocated. Grayscale sources are used as decoded.
/// Color sources are reduced with BT.601 weights in the same fixed-point
/// form OpenCV uses; a color JPEG may still differ by ±1 per pixel from a
/// decoder that hands out the Y plane directly.
pub fn decode_grayscale(bytes: &[u8]) -> DetectionResult<GrayImage> {
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_FRAME_DIMENSION);
    limits.max_image_height = Some(MAX_FRAME_DIMENSION);
    limits.max_alloc = Some(MAX_DECODE_ALLOC);

    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DetectionError::Decode(e.to_string()))?;
    reader.limits(limits);
    let decoded = reader
        .decode()
        .map_err(|e| DetectionError::Decode(e.to_string()))?;

    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(DetectionError::Decode("image has no pixels".to_string()));
    }

    let gray = match decoded {
        DynamicImage::ImageLuma8(gray) => gray,
        other if !other.color().has_color() => other.into_luma8(),
        other => {
            let rgb = other.into_rgb8();
            GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
                let [r, g, b] = rgb.get_pixel(x, y).0;
                Luma([bt601_luma(r, g, b)])
            })
        }
    };
    Ok(gray)
}

fn bt601_luma(r: u8, g: u8, b: u8) -> u8 {
    // 0.299 / 0.587 / 0.114 in Q14
    let y = (r as u32 * 4899 + g as u32 * 9617 + b as u32 * 1868 + (1 << 13)) >> 14;
    y.min(255) as u8
}

/// Per-axis source coverage for area resampling: for every output index,
/// the overlapping source indices and their overlap fraction.
fn area_weights(src_len: usize, dst_len: usize) -> Vec<Vec<(usize, f64)>> {
    let scale = src_len as f64 / dst_len as f64;

    (0..dst_len)
        .map(|o| {
            let start = o as f64 * scale;
            let end = ((o + 1) as f64 * scale).min(src_len as f64);
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).min(src_len);

            let mut weights: Vec<(usize, f64)> = (first..last)
                .filter_map(|i| {
                    let overlap = (end.min((i + 1) as f64) - start.max(i as f64)).max(0.0);
                    (overlap > 1e-12).then_some((i, overlap))
                })
                .collect();

            let total: f64 = weights.iter().map(|(_, w)| w).sum();
            for (_, w) in &mut weights {
                *w /= total;
            }
            weights
        })
        .collect()
}

/// Resample with pixel-area relation.
///
/// Each output pixel is the coverage-weighted mean of the source pixels its
/// footprint overlaps; an integer downscale factor reduces to plain block
/// averaging. Works on any view, so a `u8` image buffer is read in place.
pub fn resize_area<S, A>(src: &ArrayBase<S, Ix2>, height: usize, width: usize) -> Array2<f32>
where
    S: Data<Elem = A>,
    A: Copy + Into<f64>,
{
    let (src_h, src_w) = src.dim();
    let rows = area_weights(src_h, height);
    let cols = area_weights(src_w, width);

    Array2::from_shape_fn((height, width), |(oy, ox)| {
        let mut acc = 0.0f64;
        for &(iy, wy) in &rows[oy] {
            for &(ix, wx) in &cols[ox] {
                let px: f64 = src[[iy, ix]].into();
                acc += wy * wx * px;
            }
        }
        acc as f32
    })
}

/// A preprocessed model input: `FRAME_SIZE`×`FRAME_SIZE`, values in `[0,1]`
#[derive(Debug, Clone)]
pub struct Frame {
    pixels: Array2<f32>,
}

impl Frame {
    /// Wrap an already-normalized matrix
    pub fn from_pixels(pixels: Array2<f32>) -> DetectionResult<Self> {
        if pixels.dim() != (FRAME_SIZE, FRAME_SIZE) {
            return Err(DetectionError::InvalidInput(format!(
                "frame must be {}x{}, got {:?}",
                FRAME_SIZE,
                FRAME_SIZE,
                pixels.dim()
            )));
        }
        Ok(Self { pixels })
    }

    pub fn pixels(&self) -> &Array2<f32> {
        &self.pixels
    }

    /// Row-major values, i.e. the `[1, H, W, 1]` batch layout flattened
    pub fn to_vec(&self) -> Vec<f32> {
        self.pixels.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

/// Resize and normalize a decoded frame
pub fn preprocess(image: &GrayImage) -> DetectionResult<Frame> {
    let (width, height) = image.dimensions();
    // 画素バッファをそのまま参照 (f32 行列は出力側の 128x128 のみ)
    let src = ArrayView2::from_shape(
        (height as usize, width as usize),
        image.as_raw().as_slice(),
    )
    .map_err(|e| DetectionError::InvalidInput(e.to_string()))?;

    // 8bit 画像として丸めてから正規化
    let resized = resize_area(&src, FRAME_SIZE, FRAME_SIZE);
    let pixels = resized.mapv(|v| v.round().clamp(0.0, 255.0) / 255.0);

    Frame::from_pixels(pixels)
}

/// Mean squared error between a frame and its reconstruction
pub fn reconstruction_error(input: &Frame, reconstruction: &[f32]) -> DetectionResult<f64> {
    if reconstruction.len() != input.len() {
        return Err(DetectionError::ShapeMismatch {
            expected: input.len(),
            actual: reconstruction.len(),
        });
    }

    let sum: f64 = input
        .pixels
        .iter()
        .zip(reconstruction)
        .map(|(&a, &b)| {
            let diff = a as f64 - b as f64;
            diff * diff
        })
        .sum();
    let error = sum / input.len() as f64;

    if !error.is_finite() {
        return Err(DetectionError::Inference(
            "reconstruction produced non-finite values".to_string(),
        ));
    }
    Ok(error)
}

/// Strict comparison: an error of exactly the threshold is not anomalous
pub fn is_anomalous(error: f64) -> bool {
    error > ANOMALY_THRESHOLD
}

/// Outcome of a frame check
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameVerdict {
    pub anomaly: bool,
    pub error: f64,
}

impl FrameVerdict {
    pub fn from_error(error: f64) -> Self {
        Self {
            anomaly: is_anomalous(error),
            error,
        }
    }
}

/// Runs decoded frames through the reconstruction model
pub struct FrameAnalyzer {
    model: Arc<dyn ReconstructionModel>,
}

impl FrameAnalyzer {
    pub fn new(model: Arc<dyn ReconstructionModel>) -> Self {
        Self { model }
    }

    pub fn analyze(&self, image: &GrayImage) -> DetectionResult<FrameVerdict> {
        let frame = preprocess(image)?;
        let reconstruction = self.model.reconstruct(&frame)?;
        let error = reconstruction_error(&frame, &reconstruction)?;

        debug!(model = self.model.name(), error, "frame reconstructed");
        Ok(FrameVerdict::from_error(error))
    }
}
