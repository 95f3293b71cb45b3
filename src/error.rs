use std::path::PathBuf;

use thiserror::Error;

/// Artifact failures are fatal for the process lifetime: the store caches the
/// first outcome and every later request observes the same error until the
/// process restarts with a usable artifact.
#[derive(Debug, Clone, Error)]
pub enum ArtifactError {
    #[error("model artifact not found at {path}; run the trainer and publish the artifact first")]
    Missing { path: PathBuf },

    #[error("model artifact at {path} is unusable: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

/// Client-input faults reported by the sample normalizer. Every shape variant
/// names the zero-based index of the offending element.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("samples must not be empty")]
    Empty,

    #[error("samples must be an array")]
    NotAnArray,

    #[error("sample {index} must carry 64 values, got {got}")]
    WrongLength { index: usize, got: usize },

    #[error("sample {index} must have 8 rows, got {rows}")]
    WrongRowCount { index: usize, rows: usize },

    #[error("sample {index} row {row} must have 8 values, got {got}")]
    WrongRowWidth { index: usize, row: usize, got: usize },

    #[error("sample {index} has a non-numeric value at position {position}")]
    NonNumeric { index: usize, position: usize },

    #[error("sample {index} must be either a flat 64-value vector or an 8x8 grid")]
    Malformed { index: usize },
}

#[derive(Debug, Clone, Error)]
pub enum PredictError {
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Engine-level re-check of the normalizer contract. Unreachable after a
    /// successful normalization pass.
    #[error("expected samples with 64 features, got {observed}")]
    ShapeMismatch { observed: usize },

    #[error("model prediction failed: {0}")]
    Model(String),
}
