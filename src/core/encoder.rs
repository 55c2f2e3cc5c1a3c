// File: src/core/encoder.rs
use crate::core::types::{DiseaseCode, SymptomCode, SENTINEL};
use crate::error::EncoderLoadError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// A fitted categorical encoder: a bijection between a fixed set of labels
/// and the codes `0..len`. Codes follow the lexicographic order of the labels.
///
/// Only the ordered label list is persisted; the reverse index is rebuilt on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct LabelEncoder {
    classes: Vec<String>,
    index: HashMap<String, u32>,
}

impl LabelEncoder {
    /// Fits an encoder over the distinct values of `labels`.
    pub fn fit<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let distinct: BTreeSet<String> = labels.into_iter().map(Into::into).collect();
        let classes: Vec<String> = distinct.into_iter().collect();
        let index = classes
            .iter()
            .enumerate()
            .map(|(code, label)| (label.clone(), code as u32))
            .collect();
        Self { classes, index }
    }

    /// O(1) lookup of a label's code.
    pub fn transform(&self, label: &str) -> Option<u32> {
        self.index.get(label).copied()
    }

    pub fn inverse_transform(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl TryFrom<Vec<String>> for LabelEncoder {
    type Error = String;

    fn try_from(classes: Vec<String>) -> Result<Self, Self::Error> {
        if let Some(pair) = classes.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(format!(
                "labels are not strictly ordered: {:?} before {:?}",
                pair[0], pair[1]
            ));
        }
        Ok(Self::fit(classes))
    }
}

impl From<LabelEncoder> for Vec<String> {
    fn from(encoder: LabelEncoder) -> Self {
        encoder.classes
    }
}

/// The single symptom encoding shared by every slot. The sentinel is always
/// part of the vocabulary and absorbs unseen symptom names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LabelEncoder", into = "LabelEncoder")]
pub struct SymptomEncoder {
    encoder: LabelEncoder,
    sentinel: SymptomCode,
}

impl SymptomEncoder {
    /// Fits over the observed symptom names plus the sentinel.
    pub fn fit<I, S>(observed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels = observed
            .into_iter()
            .map(Into::into)
            .chain(std::iter::once(SENTINEL.to_string()));
        let encoder = LabelEncoder::fit(labels);
        let sentinel = encoder.transform(SENTINEL).unwrap_or_default();
        Self { encoder, sentinel }
    }

    /// Code of `name`, or the sentinel's code when `name` was never seen.
    pub fn encode(&self, name: &str) -> SymptomCode {
        self.encoder.transform(name).unwrap_or(self.sentinel)
    }

    pub fn sentinel_code(&self) -> SymptomCode {
        self.sentinel
    }

    pub fn len(&self) -> usize {
        self.encoder.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoder.is_empty()
    }

    pub fn vocabulary(&self) -> &[String] {
        self.encoder.classes()
    }
}

impl TryFrom<LabelEncoder> for SymptomEncoder {
    type Error = String;

    fn try_from(encoder: LabelEncoder) -> Result<Self, Self::Error> {
        let sentinel = encoder
            .transform(SENTINEL)
            .ok_or_else(|| format!("symptom vocabulary lacks the {SENTINEL:?} sentinel"))?;
        Ok(Self { encoder, sentinel })
    }
}

impl From<SymptomEncoder> for LabelEncoder {
    fn from(symptoms: SymptomEncoder) -> Self {
        symptoms.encoder
    }
}

/// The fitted `{symptom, disease}` encoder pair. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderStore {
    symptoms: SymptomEncoder,
    diseases: LabelEncoder,
}

impl EncoderStore {
    pub fn new(symptoms: SymptomEncoder, diseases: LabelEncoder) -> Self {
        Self { symptoms, diseases }
    }

    /// Checks the invariants a freshly deserialized store must satisfy.
    pub(crate) fn validate(&self) -> Result<(), EncoderLoadError> {
        if self.diseases.is_empty() {
            return Err(EncoderLoadError::Inconsistent {
                reason: "disease vocabulary is empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn encode_symptom(&self, name: &str) -> SymptomCode {
        self.symptoms.encode(name)
    }

    pub fn sentinel_code(&self) -> SymptomCode {
        self.symptoms.sentinel_code()
    }

    pub fn encode_disease(&self, name: &str) -> Option<DiseaseCode> {
        self.diseases.transform(name)
    }

    /// Name of a disease code.
    ///
    /// # Panics
    ///
    /// Panics when `code` is outside the disease vocabulary: the model and
    /// encoders disagree, which no request can recover from.
    pub fn decode_disease(&self, code: DiseaseCode) -> &str {
        match self.diseases.inverse_transform(code) {
            Some(name) => name,
            None => panic!(
                "disease code {code} out of range for {} classes: model and encoders do not match",
                self.diseases.len()
            ),
        }
    }

    pub fn symptom_count(&self) -> usize {
        self.symptoms.len()
    }

    pub fn disease_count(&self) -> usize {
        self.diseases.len()
    }

    pub fn diseases(&self) -> &[String] {
        self.diseases.classes()
    }

    /// Selectable symptom names in sorted order, without the sentinel.
    pub fn symptoms(&self) -> Vec<&str> {
        self.symptoms
            .vocabulary()
            .iter()
            .map(String::as_str)
            .filter(|name| *name != SENTINEL)
            .collect()
    }
}
