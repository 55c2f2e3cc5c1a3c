// File: src/learning.rs
use crate::core::encoder::{EncoderStore, LabelEncoder, SymptomEncoder};
use crate::core::types::{DiseaseCode, FeatureVector, SENTINEL, SLOT_COUNT};
use crate::dataset::{Dataset, DatasetRow};

/// Output of the encoding stage: the fitted encoders and every row of the
/// dataset re-expressed as `(feature vector, disease code)`.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedDataset {
    pub store: EncoderStore,
    pub rows: Vec<(FeatureVector, DiseaseCode)>,
}

/// Builds vocabularies and encoders from a labeled dataset.
///
/// Pure transform; model fitting is a separate stage consuming its output.
pub struct EncodingBuilder;

impl EncodingBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, dataset: &Dataset) -> EncodedDataset {
        let symptoms = SymptomEncoder::fit(dataset.unique_symptoms());
        let diseases = LabelEncoder::fit(dataset.rows().iter().map(|row| row.disease.clone()));
        let store = EncoderStore::new(symptoms, diseases);

        let rows = dataset
            .rows()
            .iter()
            .filter_map(|row| {
                let disease = store.encode_disease(&row.disease)?;
                Some((Self::encode_row(&store, row), disease))
            })
            .collect();

        tracing::debug!(
            symptoms = store.symptom_count(),
            diseases = store.disease_count(),
            "fitted encoders"
        );
        EncodedDataset { store, rows }
    }

    /// Empty cells become the sentinel, the same fallback the feature
    /// assembler applies at inference time.
    fn encode_row(store: &EncoderStore, row: &DatasetRow) -> FeatureVector {
        let mut slots = [store.sentinel_code(); SLOT_COUNT];
        for (slot, cell) in slots.iter_mut().zip(&row.symptoms) {
            *slot = store.encode_symptom(cell.as_deref().unwrap_or(SENTINEL));
        }
        FeatureVector(slots)
    }
}

impl Default for EncodingBuilder {
    fn default() -> Self {
        Self::new()
    }
}
