//! Error types for the diagnosis pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// The encoder artifact could not be loaded. Fatal to the whole inference
/// subsystem: the engine starts degraded.
#[derive(Debug, Error)]
pub enum EncoderLoadError {
    #[error("encoder artifact not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read encoder artifact {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("encoder artifact {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    /// The stored vocabulary is not a valid label encoding.
    #[error("encoder artifact is inconsistent: {reason}")]
    Inconsistent { reason: String },
}

/// The model artifact could not be loaded or does not fit the encoders.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("model artifact not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read model artifact {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model artifact {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    /// Decodes, but its count tables disagree with its own dimensions.
    #[error("model artifact is inconsistent: {reason}")]
    Inconsistent { reason: String },

    #[error(
        "model was fitted for {model_diseases} diseases and {model_symptoms} symptom codes, \
         encoders have {encoder_diseases} and {encoder_symptoms}"
    )]
    Mismatch {
        model_diseases: usize,
        model_symptoms: usize,
        encoder_diseases: usize,
        encoder_symptoms: usize,
    },
}

/// Why the engine cannot serve predictions.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Encoders(#[from] EncoderLoadError),

    #[error(transparent)]
    Model(#[from] ModelLoadError),
}

/// Writing an artifact to disk failed.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode artifact: {0}")]
    Encode(#[from] bincode::Error),
}

/// Fewer symptoms than the minimum clinically meaningful input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("at least {required} symptoms are required for prediction, got {given}")]
pub struct InsufficientSymptoms {
    pub given: usize,
    pub required: usize,
}

/// A prediction request could not be served.
#[derive(Debug, Error)]
pub enum PredictError {
    /// User-correctable: the request is not processed.
    #[error(transparent)]
    InsufficientSymptoms(#[from] InsufficientSymptoms),

    /// Model or encoders failed to load at startup.
    #[error("inference unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Problems with a training dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read dataset {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("dataset needs at least {required} symptom columns plus a disease column, found {found} columns")]
    TooFewColumns { found: usize, required: usize },

    #[error("dataset has no rows")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("row {row} has an empty disease label")]
    MissingLabel { row: usize },

    #[error("holdout split leaves no rows to fit on ({rows} rows, test fraction {test_fraction})")]
    NoTrainingRows { rows: usize, test_fraction: f64 },

    #[error("smoothing alpha must be finite, got {alpha}")]
    InvalidAlpha { alpha: f64 },
}

/// The prediction history store failed.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history store error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
