//! Tabular training data: `symptom1..symptomK, disease`, one example per row.

use std::collections::BTreeSet;
use std::path::Path;

use crate::core::types::MIN_SYMPTOMS;
use crate::error::DatasetError;

/// One labeled example. Empty symptom cells are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRow {
    pub symptoms: Vec<Option<String>>,
    pub disease: String,
}

/// A validated dataset: at least `MIN_SYMPTOMS` symptom columns, at least one
/// row, every row as wide as the header and carrying a disease label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    symptom_columns: Vec<String>,
    rows: Vec<DatasetRow>,
}

impl Dataset {
    /// Cells are trimmed and blank symptom cells become `None`.
    pub fn new(symptom_columns: Vec<String>, mut rows: Vec<DatasetRow>) -> Result<Self, DatasetError> {
        for row in &mut rows {
            for cell in &mut row.symptoms {
                *cell = cell
                    .take()
                    .map(|value| value.trim().to_string())
                    .filter(|value| !value.is_empty());
            }
            row.disease = row.disease.trim().to_string();
        }

        if symptom_columns.len() < MIN_SYMPTOMS {
            return Err(DatasetError::TooFewColumns {
                found: symptom_columns.len() + 1,
                required: MIN_SYMPTOMS,
            });
        }
        if rows.is_empty() {
            return Err(DatasetError::Empty);
        }
        for (idx, row) in rows.iter().enumerate() {
            if row.symptoms.len() != symptom_columns.len() {
                return Err(DatasetError::RaggedRow {
                    row: idx + 1,
                    found: row.symptoms.len() + 1,
                    expected: symptom_columns.len() + 1,
                });
            }
            if row.disease.is_empty() {
                return Err(DatasetError::MissingLabel { row: idx + 1 });
            }
        }
        Ok(Self {
            symptom_columns,
            rows,
        })
    }

    /// Reads a CSV with a header row. The last column is the disease label,
    /// every column before it is a symptom slot.
    pub fn from_csv(path: &Path) -> Result<Self, DatasetError> {
        if !path.exists() {
            return Err(DatasetError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let csv_error = |source: csv::Error| DatasetError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(csv_error)?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(|header| header.trim().to_string())
            .collect();
        let symptom_headers = headers
            .split_last()
            .map(|(_, symptoms)| symptoms.to_vec())
            .unwrap_or_default();

        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record.map_err(csv_error)?;
            let cells: Vec<&str> = record.iter().map(str::trim).collect();
            let Some((disease, symptoms)) = cells.split_last() else {
                return Err(DatasetError::RaggedRow {
                    row: idx + 1,
                    found: 0,
                    expected: headers.len(),
                });
            };
            rows.push(DatasetRow {
                symptoms: symptoms
                    .iter()
                    .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
                    .collect(),
                disease: disease.to_string(),
            });
        }

        tracing::info!(
            path = %path.display(),
            rows = rows.len(),
            symptom_columns = symptom_headers.len(),
            "loaded dataset"
        );
        Self::new(symptom_headers, rows)
    }

    pub fn symptom_columns(&self) -> &[String] {
        &self.symptom_columns
    }

    pub fn rows(&self) -> &[DatasetRow] {
        &self.rows
    }

    /// Distinct non-empty symptom values across all symptom columns, sorted.
    pub fn unique_symptoms(&self) -> Vec<String> {
        let distinct: BTreeSet<&str> = self
            .rows
            .iter()
            .flat_map(|row| row.symptoms.iter().flatten())
            .map(String::as_str)
            .collect();
        distinct.into_iter().map(str::to_string).collect()
    }
}
