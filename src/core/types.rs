// src/core/types.rs
use serde::{Deserialize, Serialize};

/// Integer code of a symptom (or the sentinel) in the shared symptom encoding.
pub type SymptomCode = u32;

/// Integer code of a disease label.
pub type DiseaseCode = u32;

/// Number of symptom slots the classifier consumes (`symptom1..symptom4`).
pub const SLOT_COUNT: usize = 4;

/// Minimum number of symptoms a caller must supply for a prediction.
pub const MIN_SYMPTOMS: usize = 3;

/// Reserved vocabulary entry meaning "no symptom in this slot".
pub const SENTINEL: &str = "None";

/// Number of ranked alternatives reported with each prediction.
pub const TOP_K: usize = 3;

/// Fixed-width encoded symptom selection, one code per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureVector(pub [SymptomCode; SLOT_COUNT]);

impl FeatureVector {
    pub fn slots(&self) -> &[SymptomCode; SLOT_COUNT] {
        &self.0
    }
}

/// Dense class-probability output of a classifier, indexed by disease code.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityDistribution(Vec<f64>);

impl ProbabilityDistribution {
    pub fn new(probabilities: Vec<f64>) -> Self {
        Self(probabilities)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, code: DiseaseCode) -> Option<f64> {
        self.0.get(code as usize).copied()
    }
}

/// A disease together with its probability expressed as a percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedDisease {
    pub disease: String,
    /// Probability x 100, in `[0, 100]`.
    pub percent: f64,
}

/// The ranked answer for one prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub top1: RankedDisease,
    pub top3: Vec<RankedDisease>,
}

/// Full outcome of a prediction: the symptoms as given plus the ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub symptoms: Vec<String>,
    pub predicted_disease: String,
    pub probability: f64,
    pub top3: Vec<RankedDisease>,
}

impl Diagnosis {
    pub fn new(symptoms: Vec<String>, ranking: Ranking) -> Self {
        Self {
            symptoms,
            predicted_disease: ranking.top1.disease,
            probability: ranking.top1.percent,
            top3: ranking.top3,
        }
    }
}
