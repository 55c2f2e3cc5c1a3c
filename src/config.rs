use std::path::{Path, PathBuf};

/// Default artifact and data file names, relative to the working directory.
pub const MODEL_FILE: &str = "model.bin";
pub const ENCODERS_FILE: &str = "encoders.bin";
pub const DATASET_FILE: &str = "dataset.csv";
pub const DATABASE_FILE: &str = "disease_prediction.db";

/// Where the engine finds its artifacts, training data and history store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DxConfig {
    pub model_path: PathBuf,
    pub encoders_path: PathBuf,
    pub dataset_path: PathBuf,
    pub database_path: PathBuf,
}

impl DxConfig {
    /// All files under `dir` with their default names.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            model_path: dir.join(MODEL_FILE),
            encoders_path: dir.join(ENCODERS_FILE),
            dataset_path: dir.join(DATASET_FILE),
            database_path: dir.join(DATABASE_FILE),
        }
    }
}

impl Default for DxConfig {
    fn default() -> Self {
        Self::in_dir(Path::new("."))
    }
}
