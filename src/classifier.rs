use std::path::Path;

use ndarray::Array4;
use tract_onnx::prelude::*;

use crate::config::{IMG_HEIGHT, IMG_WIDTH};
use crate::error::PredictError;

pub const UNKNOWN_LABEL: &str = "Unknown";

type RunnablePlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Seam between the HTTP layer and the ML runtime. Production code uses the
/// ONNX-backed implementation; tests substitute fixed score vectors.
pub trait Classifier: Send + Sync {
    /// Runs a forward pass over a single-image batch and returns the raw
    /// score vector for that image.
    fn scores(&self, batch: Array4<f32>) -> Result<Vec<f32>, PredictError>;
}

pub struct OnnxClassifier {
    plan: RunnablePlan,
}

impl OnnxClassifier {
    pub fn load(path: &Path) -> TractResult<Self> {
        let plan = tract_onnx::onnx()
            .model_for_path(path)?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(
                    f32::datum_type(),
                    tvec!(1, IMG_HEIGHT as usize, IMG_WIDTH as usize, 3),
                ),
            )?
            .into_optimized()?
            .into_runnable()?;
        Ok(Self { plan })
    }
}

impl Classifier for OnnxClassifier {
    fn scores(&self, batch: Array4<f32>) -> Result<Vec<f32>, PredictError> {
        let dims = batch.dim();
        let tensor = tract_ndarray::Array4::from_shape_vec(dims, batch.into_raw_vec())
            .map_err(|e| PredictError::Inference(e.to_string()))?
            .into_tensor();
        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| PredictError::Inference(e.to_string()))?;
        let view = outputs[0]
            .to_array_view::<f32>()
            .map_err(|e| PredictError::Inference(e.to_string()))?;
        // Batch size is pinned to 1, so the flattened view is the score
        // vector of the only image.
        Ok(view.iter().copied().collect())
    }
}

/// Index of the highest score, ties broken by the lowest index.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &score) in scores.iter().enumerate() {
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((idx, score));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Maps the winning index to its label and raw confidence. An index past
/// the end of the label list yields the "Unknown" sentinel instead of an
/// error.
pub fn top_prediction(scores: &[f32], labels: &[String]) -> Option<(String, f32)> {
    let idx = argmax(scores)?;
    let label = labels
        .get(idx)
        .cloned()
        .unwrap_or_else(|| UNKNOWN_LABEL.to_string());
    Some((label, scores[idx]))
}
