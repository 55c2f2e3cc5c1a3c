// File: src/core/model.rs
use crate::core::types::{DiseaseCode, FeatureVector, ProbabilityDistribution, SLOT_COUNT};
use crate::error::ModelLoadError;
use serde::{Deserialize, Serialize};

/// Default additive (Laplace) smoothing.
pub const DEFAULT_ALPHA: f64 = 1.0;

/// A pre-trained multi-class probabilistic classifier over symptom vectors.
///
/// Implementations are read-only after construction and shared across requests.
pub trait Classifier: Send + Sync {
    /// Number of disease classes in the output distribution.
    fn class_count(&self) -> usize;

    /// Size of the symptom vocabulary the model was fitted against.
    fn symptom_count(&self) -> usize;

    /// One probability per disease code, summing to 1.
    fn score(&self, features: &FeatureVector) -> ProbabilityDistribution;

    /// Most probable class; ties go to the lowest code.
    fn predict(&self, features: &FeatureVector) -> DiseaseCode {
        let distribution = self.score(features);
        let mut best: (DiseaseCode, f64) = (0, f64::NEG_INFINITY);
        for (code, &p) in distribution.as_slice().iter().enumerate() {
            if p > best.1 {
                best = (code as DiseaseCode, p);
            }
        }
        best.0
    }
}

/// Categorical naive Bayes over the four symptom slots.
///
/// Each slot is its own categorical feature sharing the symptom vocabulary,
/// so "Fever in slot 1" and "Fever in slot 3" are counted separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaiveBayesModel {
    alpha: f64,
    n_classes: usize,
    n_symptoms: usize,
    /// Training rows per class.
    class_counts: Vec<u64>,
    /// Flattened `[class][slot][symptom]` co-occurrence counts.
    slot_counts: Vec<u64>,
}

impl NaiveBayesModel {
    /// Fits the model with one counting pass over `rows`.
    /// O(rows * SLOT_COUNT). Non-positive `alpha` is clamped to the smallest
    /// positive value so every class keeps a finite score.
    pub fn fit(
        rows: &[(FeatureVector, DiseaseCode)],
        n_symptoms: usize,
        n_classes: usize,
        alpha: f64,
    ) -> Self {
        let mut model = Self {
            alpha: alpha.max(f64::MIN_POSITIVE),
            n_classes,
            n_symptoms,
            class_counts: vec![0; n_classes],
            slot_counts: vec![0; n_classes * SLOT_COUNT * n_symptoms],
        };

        for (features, class) in rows {
            let class = *class as usize;
            if class >= n_classes {
                continue;
            }
            model.class_counts[class] += 1;
            for (slot, &symptom) in features.slots().iter().enumerate() {
                if let Some(idx) = model.index(class, slot, symptom as usize) {
                    model.slot_counts[idx] += 1;
                }
            }
        }
        model
    }

    fn index(&self, class: usize, slot: usize, symptom: usize) -> Option<usize> {
        if symptom >= self.n_symptoms {
            return None;
        }
        Some((class * SLOT_COUNT + slot) * self.n_symptoms + symptom)
    }

    fn count(&self, class: usize, slot: usize, symptom: usize) -> u64 {
        self.index(class, slot, symptom)
            .and_then(|idx| self.slot_counts.get(idx).copied())
            .unwrap_or(0)
    }

    fn log_joint(&self, class: usize, features: &FeatureVector) -> f64 {
        let total: u64 = self.class_counts.iter().sum();
        let class_count = self.class_counts[class] as f64;
        let prior =
            (class_count + self.alpha) / (total as f64 + self.alpha * self.n_classes as f64);

        let denominator = class_count + self.alpha * self.n_symptoms as f64;
        features
            .slots()
            .iter()
            .enumerate()
            .map(|(slot, &symptom)| {
                let hits = self.count(class, slot, symptom as usize) as f64;
                ((hits + self.alpha) / denominator).ln()
            })
            .sum::<f64>()
            + prior.ln()
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Checks that a decoded model can be scored without indexing out of
    /// bounds or producing NaN.
    pub(crate) fn validate(&self) -> Result<(), ModelLoadError> {
        let inconsistent = |reason: String| Err(ModelLoadError::Inconsistent { reason });
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return inconsistent(format!("smoothing alpha {} is not finite and positive", self.alpha));
        }
        if self.n_classes == 0 {
            return inconsistent("model has no disease classes".to_string());
        }
        if self.class_counts.len() != self.n_classes {
            return inconsistent(format!(
                "{} class counts for {} classes",
                self.class_counts.len(),
                self.n_classes
            ));
        }
        let expected = self
            .n_classes
            .checked_mul(SLOT_COUNT)
            .and_then(|n| n.checked_mul(self.n_symptoms));
        if expected != Some(self.slot_counts.len()) {
            return inconsistent(format!(
                "{} slot counts for {} classes and {} symptom codes",
                self.slot_counts.len(),
                self.n_classes,
                self.n_symptoms
            ));
        }
        Ok(())
    }
}

impl Classifier for NaiveBayesModel {
    fn class_count(&self) -> usize {
        self.n_classes
    }

    fn symptom_count(&self) -> usize {
        self.n_symptoms
    }

    fn score(&self, features: &FeatureVector) -> ProbabilityDistribution {
        let log_joint: Vec<f64> = (0..self.n_classes)
            .map(|class| self.log_joint(class, features))
            .collect();

        // Normalise in log space so tiny joint probabilities do not underflow.
        let max = log_joint.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let weights: Vec<f64> = log_joint.iter().map(|l| (l - max).exp()).collect();
        let sum: f64 = weights.iter().sum();
        ProbabilityDistribution::new(weights.into_iter().map(|w| w / sum).collect())
    }
}
