// File: src/persistence.rs
use crate::core::encoder::EncoderStore;
use crate::core::model::NaiveBayesModel;
use crate::error::{EncoderLoadError, ModelLoadError, PersistError};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes `value` next to `path` and renames it into place, so a crash never
/// leaves a half-written artifact behind.
fn write_atomic<T: Serialize>(value: &T, path: &Path) -> Result<(), PersistError> {
    let io_error = |source: io::Error| PersistError::Write {
        path: path.to_path_buf(),
        source,
    };
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir).map_err(io_error)?;

    let temp_file = NamedTempFile::new_in(parent_dir).map_err(io_error)?;
    let mut writer = BufWriter::new(&temp_file);
    bincode::serialize_into(&mut writer, value)?;
    writer.flush().map_err(io_error)?;
    drop(writer);

    temp_file
        .persist(path)
        .map_err(|e| io_error(e.error))?;
    Ok(())
}

pub fn save_encoders(store: &EncoderStore, path: &Path) -> Result<(), PersistError> {
    write_atomic(store, path)?;
    tracing::info!(path = %path.display(), "saved encoders");
    Ok(())
}

pub fn save_model(model: &NaiveBayesModel, path: &Path) -> Result<(), PersistError> {
    write_atomic(model, path)?;
    tracing::info!(path = %path.display(), "saved model");
    Ok(())
}

fn open(path: &Path) -> io::Result<BufReader<File>> {
    File::open(path).map(BufReader::new)
}

pub fn load_encoders(path: &Path) -> Result<EncoderStore, EncoderLoadError> {
    let reader = open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => EncoderLoadError::NotFound {
            path: path.to_path_buf(),
        },
        _ => EncoderLoadError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let store: EncoderStore =
        bincode::deserialize_from(reader).map_err(|source| EncoderLoadError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;
    store.validate()?;
    Ok(store)
}

pub fn load_model(path: &Path) -> Result<NaiveBayesModel, ModelLoadError> {
    let reader = open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ModelLoadError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ModelLoadError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let model: NaiveBayesModel =
        bincode::deserialize_from(reader).map_err(|source| ModelLoadError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;
    model.validate()?;
    Ok(model)
}
