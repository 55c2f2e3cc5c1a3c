//! Append-only prediction history backed by SQLite.

use std::path::Path;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::core::types::Diagnosis;
use crate::error::HistoryError;

/// A prediction about to be recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPrediction {
    /// Symptom names joined with `", "`.
    pub symptoms: String,
    pub predicted_disease: String,
    /// Percentage in `[0, 100]`.
    pub probability: f64,
}

impl NewPrediction {
    pub fn from_diagnosis(diagnosis: &Diagnosis) -> Self {
        Self {
            symptoms: diagnosis.symptoms.join(", "),
            predicted_disease: diagnosis.predicted_disease.clone(),
            probability: diagnosis.probability,
        }
    }
}

/// A stored prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRecord {
    pub id: i64,
    pub symptoms: String,
    pub predicted_disease: String,
    pub probability: f64,
    pub created_at: NaiveDateTime,
}

/// Destination for prediction records. Callers treat failures as best-effort.
pub trait HistorySink {
    fn append(&self, prediction: &NewPrediction) -> Result<(), HistoryError>;
}

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS predictions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    symptoms TEXT,
    predicted_disease TEXT,
    probability REAL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

pub struct SqliteHistory {
    conn: Connection,
}

impl SqliteHistory {
    /// Opens (or creates) the database file and bootstraps the table.
    pub fn open(path: &Path) -> Result<Self, HistoryError> {
        Self::bootstrap(Connection::open(path)?)
    }

    /// In-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, HistoryError> {
        Self::bootstrap(Connection::open_in_memory()?)
    }

    fn bootstrap(conn: Connection) -> Result<Self, HistoryError> {
        conn.execute_batch(CREATE_TABLE)?;
        Ok(Self { conn })
    }

    /// Every record, newest first.
    pub fn recent(&self) -> Result<Vec<PredictionRecord>, HistoryError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, symptoms, predicted_disease, probability, created_at
             FROM predictions ORDER BY created_at DESC, id DESC",
        )?;
        let records = stmt
            .query_map([], |row| {
                Ok(PredictionRecord {
                    id: row.get(0)?,
                    symptoms: row.get(1)?,
                    predicted_disease: row.get(2)?,
                    probability: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

impl HistorySink for SqliteHistory {
    fn append(&self, prediction: &NewPrediction) -> Result<(), HistoryError> {
        self.conn.execute(
            "INSERT INTO predictions (symptoms, predicted_disease, probability)
             VALUES (?1, ?2, ?3)",
            params![
                prediction.symptoms,
                prediction.predicted_disease,
                prediction.probability
            ],
        )?;
        Ok(())
    }
}
