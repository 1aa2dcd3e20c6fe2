//! Frame anomaly detection and network-flow classification
//!
//! Both analyses delegate the actual scoring to pre-trained artifacts that
//! are loaded once at startup:
//!
//! - **Frame**: grayscale decode, area resize to 128×128, `[0,1]` scaling,
//!   then reconstruction through an autoencoder. The mean squared
//!   reconstruction error is the anomaly score.
//! - **Flow**: three numeric flow features are flattened into a single row
//!   and handed to a tabular classifier.
//!
//! ## 使用例
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use surveil_rs::detection::{FrameAnalyzer, OnnxReconstructionModel};
//!
//! # fn example(bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
//! let model = OnnxReconstructionModel::load("models/border_anomaly_detector.onnx".as_ref())?;
//! let analyzer = FrameAnalyzer::new(Arc::new(model));
//!
//! let image = surveil_rs::detection::frame::decode_grayscale(bytes)?;
//! let verdict = analyzer.analyze(&image)?;
//! if verdict.anomaly {
//!     println!("anomaly: error={}", verdict.error);
//! }
//! # Ok(())
//! # }
//! ```

pub mod flow;
pub mod frame;
pub mod models;

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub use flow::{FlowAnalyzer, FlowRecord, FlowRejection, FlowVerdict};
pub use frame::{Frame, FrameAnalyzer, FrameRejection, FrameVerdict};
pub use models::{FlowModel, ForestFlowModel, OnnxReconstructionModel, ReconstructionModel};

use crate::config::ModelConfig;

/// Detection errors
#[derive(Debug, Error)]
pub enum DetectionError {
    /// Artifact could not be loaded
    #[error("Model load failed: {0}")]
    ModelLoad(String),

    /// Image bytes could not be decoded
    #[error("Image decode failed: {0}")]
    Decode(String),

    /// Preprocessing received something it cannot work with
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Model output does not line up with its input
    #[error("Shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Model evaluation failed
    #[error("Inference failed: {0}")]
    Inference(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Detection result type
pub type DetectionResult<T> = Result<T, DetectionError>;

/// Analyzers backed by whichever artifacts loaded successfully.
///
/// A `None` slot is a persistent "model unavailable" condition: requests
/// check it every time and nothing retries the load.
#[derive(Clone, Default)]
pub struct Detectors {
    pub frame: Option<Arc<FrameAnalyzer>>,
    pub flow: Option<Arc<FlowAnalyzer>>,
}

impl Detectors {
    /// Load both artifacts, logging and tolerating individual failures
    pub fn load(config: &ModelConfig) -> Self {
        let frame = match OnnxReconstructionModel::load(&config.frame_model) {
            Ok(model) => {
                info!(path = %config.frame_model.display(), "Frame reconstruction model loaded");
                Some(Arc::new(FrameAnalyzer::new(Arc::new(model))))
            }
            Err(e) => {
                warn!(error = %e, "Frame reconstruction model unavailable");
                None
            }
        };

        let flow = match ForestFlowModel::load(&config.flow_model) {
            Ok(model) => {
                info!(path = %config.flow_model.display(), "Flow classifier loaded");
                Some(Arc::new(FlowAnalyzer::new(Arc::new(model))))
            }
            Err(e) => {
                warn!(error = %e, "Flow classifier unavailable");
                None
            }
        };

        Self { frame, flow }
    }

    pub fn with_frame_model(mut self, model: Arc<dyn ReconstructionModel>) -> Self {
        self.frame = Some(Arc::new(FrameAnalyzer::new(model)));
        self
    }

    pub fn with_flow_model(mut self, model: Arc<dyn FlowModel>) -> Self {
        self.flow = Some(Arc::new(FlowAnalyzer::new(model)));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_artifacts_leave_slots_empty() {
        let config = ModelConfig {
            frame_model: PathBuf::from("/nonexistent/frame.onnx"),
            flow_model: PathBuf::from("/nonexistent/flow.json"),
        };
        let detectors = Detectors::load(&config);
        assert!(detectors.frame.is_none());
        assert!(detectors.flow.is_none());
    }
}
