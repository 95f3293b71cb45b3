//! Prediction dispatch over the cached artifact, with the dimensional
//! contract enforced at the boundary.

use std::sync::Arc;

use crate::error::PredictError;
use crate::ml::artifact::ArtifactStore;
use crate::samples::{Sample, FEATURE_COUNT};

pub struct InferenceEngine {
    store: Arc<ArtifactStore>,
}

impl InferenceEngine {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        InferenceEngine { store }
    }

    /// One label per sample, order preserving. Every sample is re-checked for
    /// 64 features even though the normalizer already guarantees it; a
    /// mismatch here means the normalizer contract was breached.
    pub fn predict(&self, batch: &[Sample]) -> Result<Vec<i64>, PredictError> {
        let artifact = self.store.load()?;
        for sample in batch {
            if sample.len() != FEATURE_COUNT {
                return Err(PredictError::ShapeMismatch {
                    observed: sample.len(),
                });
            }
        }
        artifact.model.predict(batch)
    }

    /// Best-effort explainability: 64 importances for a linear model, an
    /// empty vector otherwise. Never fails for non-linear models.
    pub fn global_importance(&self) -> Result<Vec<f64>, PredictError> {
        let artifact = self.store.load()?;
        Ok(artifact.model.mean_abs_coefficients())
    }
}
