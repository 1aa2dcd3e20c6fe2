//! Pre-trained model artifacts
//!
//! The handlers only see the [`ReconstructionModel`] and [`FlowModel`]
//! traits. Production artifacts are an ONNX export of the frame autoencoder
//! (evaluated with tract) and a smartcore random forest serialized as JSON.

use super::flow::FLOW_FEATURES;
use super::frame::{Frame, FRAME_SIZE};
use super::{DetectionError, DetectionResult};
use smartcore::ensemble::random_forest_classifier::RandomForestClassifier;
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tract_onnx::prelude::*;

/// Reconstruction network for frame anomaly scoring
pub trait ReconstructionModel: Send + Sync {
    /// Reconstruct a frame; the output is flattened in the input's layout
    fn reconstruct(&self, frame: &Frame) -> DetectionResult<Vec<f32>>;

    /// モデル名
    fn name(&self) -> &str;
}

/// Tabular classifier for flow records
pub trait FlowModel: Send + Sync {
    /// Predict the class label for one row of flow features
    fn predict(&self, features: &[f64; FLOW_FEATURES.len()]) -> DetectionResult<i64>;

    /// モデル名
    fn name(&self) -> &str;
}

/// ONNX autoencoder evaluated with tract
pub struct OnnxReconstructionModel {
    plan: TypedRunnableModel<TypedModel>,
    path: PathBuf,
}

impl OnnxReconstructionModel {
    /// Load and optimize the network for a `[1, 128, 128, 1]` f32 input
    pub fn load(path: &Path) -> DetectionResult<Self> {
        let load_err = |e: TractError| DetectionError::ModelLoad(format!("{}: {}", path.display(), e));

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(load_err)?
            .with_input_fact(0, f32::fact([1, FRAME_SIZE, FRAME_SIZE, 1]).into())
            .map_err(load_err)?
            .into_optimized()
            .map_err(load_err)?
            .into_runnable()
            .map_err(load_err)?;

        Ok(Self {
            plan,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReconstructionModel for OnnxReconstructionModel {
    fn reconstruct(&self, frame: &Frame) -> DetectionResult<Vec<f32>> {
        let input = Tensor::from_shape(&[1, FRAME_SIZE, FRAME_SIZE, 1], &frame.to_vec())
            .map_err(|e| DetectionError::InvalidInput(e.to_string()))?;

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| DetectionError::Inference(e.to_string()))?;

        let output = outputs
            .first()
            .ok_or_else(|| DetectionError::Inference("model produced no outputs".to_string()))?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| DetectionError::Inference(e.to_string()))?;

        Ok(view.iter().copied().collect())
    }

    fn name(&self) -> &str {
        "onnx-autoencoder"
    }
}

/// Random forest over the three flow features
pub type FlowForest = RandomForestClassifier<f64, i64, DenseMatrix<f64>, Vec<i64>>;

/// smartcore random forest loaded from JSON
pub struct ForestFlowModel {
    forest: FlowForest,
}

impl ForestFlowModel {
    pub fn new(forest: FlowForest) -> Self {
        Self { forest }
    }

    /// Load a forest serialized with `serde_json`
    pub fn load(path: &Path) -> DetectionResult<Self> {
        let file = File::open(path)
            .map_err(|e| DetectionError::ModelLoad(format!("{}: {}", path.display(), e)))?;
        let forest: FlowForest = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| DetectionError::ModelLoad(format!("{}: {}", path.display(), e)))?;
        Ok(Self { forest })
    }

    /// Persist the forest in the format [`ForestFlowModel::load`] reads
    pub fn save(&self, path: &Path) -> DetectionResult<()> {
        let file = File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), &self.forest)
            .map_err(|e| DetectionError::Io(e.into()))
    }
}

impl FlowModel for ForestFlowModel {
    fn predict(&self, features: &[f64; FLOW_FEATURES.len()]) -> DetectionResult<i64> {
        let row: &[f64] = features;
        let x = DenseMatrix::from_2d_array(&[row]);

        let labels = self
            .forest
            .predict(&x)
            .map_err(|e| DetectionError::Inference(e.to_string()))?;

        labels
            .first()
            .copied()
            .ok_or_else(|| DetectionError::Inference("classifier returned no label".to_string()))
    }

    fn name(&self) -> &str {
        "random-forest"
    }
}
