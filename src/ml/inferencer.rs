// ============================================================
// Layer 5 - Inferencer
// ============================================================
// Applies a frozen FittedTransform and trained classifier to
// engineered records. Rows are transformed in parallel, then
// scored in a single batched forward pass.

use crate::data::{batcher::features_tensor, transform::FittedTransform};
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::vehicle::EngineeredRecord;
use crate::infra::checkpoint::{ArtifactManifest, ArtifactStore};
use crate::ml::model::RiskClassifier;
use crate::ml::InferBackend;

pub struct Inferencer {
    model:     RiskClassifier<InferBackend>,
    transform: FittedTransform,
    device:    burn::backend::ndarray::NdArrayDevice,
}

impl Inferencer {
    pub fn new(model: RiskClassifier<InferBackend>, transform: FittedTransform) -> PipelineResult<Self> {
        if model.d_input() != transform.width() {
            return Err(PipelineError::CorruptArtifact(format!(
                "classifier expects {} features but the transform produces {}",
                model.d_input(),
                transform.width()
            )));
        }
        Ok(Self { model, transform, device: Default::default() })
    }

    /// Load the trained pipeline; returns the manifest alongside.
    pub fn from_checkpoint(store: &ArtifactStore) -> PipelineResult<(Self, ArtifactManifest)> {
        let device = burn::backend::ndarray::NdArrayDevice::default();
        let artifact = store.load::<InferBackend>(&device)?;
        let inferencer = Self::new(artifact.model, artifact.transform)?;
        Ok((inferencer, artifact.manifest))
    }

    pub fn transform(&self) -> &FittedTransform {
        &self.transform
    }

    pub fn model(&self) -> &RiskClassifier<InferBackend> {
        &self.model
    }

    /// P(has_mechanical_issue = 1) per row, in input order.
    pub fn predict_proba(&self, rows: &[EngineeredRecord]) -> PipelineResult<Vec<f64>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let features = self.transform.transform_rows(rows)?;
        let input = features_tensor::<InferBackend>(&features, self.transform.width(), &self.device);

        let probs: Vec<f32> = self
            .model
            .probabilities(input)
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| PipelineError::Tensor(format!("{e:?}")))?;

        tracing::debug!("Scored {} rows", probs.len());
        Ok(probs.into_iter().map(|p| (p as f64).clamp(0.0, 1.0)).collect())
    }
}
