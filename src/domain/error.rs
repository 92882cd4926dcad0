//! Error types for the prediction pipeline

use std::path::PathBuf;

/// Result type for pipeline operations
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while training, serving or mining
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Missing, duplicated or overlapping feature-group declarations
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Configured column absent from the engineered column space
    #[error("Column '{column}' is not a {group} column of the engineered frame")]
    MissingColumn { column: String, group: &'static str },

    #[error("Dataset not found at {0}")]
    DatasetNotFound(PathBuf),

    /// Dataset present but unusable (missing columns, bad rows, no labels)
    #[error("Malformed dataset: {0}")]
    MalformedDataset(String),

    #[error("Dataset is empty: {0}")]
    EmptyDataset(String),

    /// Inference requested before a trained pipeline exists
    #[error("Model artifact missing at {0}. Train the model before predicting.")]
    ArtifactMissing(PathBuf),

    /// Artifact written by an incompatible build
    #[error("Artifact format version {found} does not match expected version {expected}")]
    ArtifactVersion { found: u32, expected: u32 },

    /// Artifact parts disagree with each other
    #[error("Corrupt artifact: {0}")]
    CorruptArtifact(String),

    /// Record presented at inference does not match the training schema
    #[error("Input shape error: {0}")]
    InputShape(String),

    #[error("Tensor error: {0}")]
    Tensor(String),

    #[error("Recorder error: {0}")]
    Recorder(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
