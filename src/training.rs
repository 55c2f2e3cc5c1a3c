//! Thin fitting stage: holdout split, naive Bayes fit and accuracy report.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::core::encoder::EncoderStore;
use crate::core::model::{Classifier, NaiveBayesModel, DEFAULT_ALPHA};
use crate::dataset::Dataset;
use crate::error::DatasetError;
use crate::learning::EncodingBuilder;

/// Knobs for one training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainOptions {
    /// Share of rows held out for evaluation, in `[0, 1)`.
    pub test_fraction: f64,
    /// Seed of the row shuffle before splitting.
    pub seed: u64,
    /// Additive smoothing of the naive Bayes counts.
    pub alpha: f64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            alpha: DEFAULT_ALPHA,
        }
    }
}

/// Summary of a training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainReport {
    pub train_rows: usize,
    pub test_rows: usize,
    /// Holdout accuracy in `[0, 1]`; `None` when nothing was held out.
    pub accuracy: Option<f64>,
}

/// Fitted artifacts ready to be persisted.
#[derive(Debug, Clone)]
pub struct TrainedArtifacts {
    pub store: EncoderStore,
    pub model: NaiveBayesModel,
    pub report: TrainReport,
}

pub fn train(dataset: &Dataset, options: TrainOptions) -> Result<TrainedArtifacts, DatasetError> {
    if !options.alpha.is_finite() {
        return Err(DatasetError::InvalidAlpha {
            alpha: options.alpha,
        });
    }

    let encoded = EncodingBuilder::new().build(dataset);
    let mut rows = encoded.rows;
    let total = rows.len();

    // A partial holdout row counts as a whole one.
    let test_fraction = options.test_fraction.clamp(0.0, 1.0);
    let test_rows = (total as f64 * test_fraction).ceil() as usize;
    if test_rows >= total {
        return Err(DatasetError::NoTrainingRows {
            rows: total,
            test_fraction,
        });
    }

    rows.shuffle(&mut StdRng::seed_from_u64(options.seed));
    let (test, fit_rows) = rows.split_at(test_rows);

    let model = NaiveBayesModel::fit(
        fit_rows,
        encoded.store.symptom_count(),
        encoded.store.disease_count(),
        options.alpha,
    );

    let accuracy = (!test.is_empty()).then(|| {
        let correct = test
            .iter()
            .filter(|(features, disease)| model.predict(features) == *disease)
            .count();
        correct as f64 / test.len() as f64
    });

    let report = TrainReport {
        train_rows: fit_rows.len(),
        test_rows: test.len(),
        accuracy,
    };
    match accuracy {
        Some(accuracy) => tracing::info!(
            train_rows = report.train_rows,
            test_rows = report.test_rows,
            "model accuracy: {:.2}%",
            accuracy * 100.0
        ),
        None => tracing::info!(train_rows = report.train_rows, "fitted without holdout"),
    }

    Ok(TrainedArtifacts {
        store: encoded.store,
        model,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DatasetRow;

    fn dataset(copies: usize) -> Dataset {
        let mut rows = Vec::new();
        for _ in 0..copies {
            for (symptoms, disease) in [
                (["Fever", "Cough", "Headache"], "Flu"),
                (["Cough", "Sneeze", "Sore throat"], "Cold"),
                (["Sneeze", "Itchy eyes", "Rash"], "Allergy"),
            ] {
                rows.push(DatasetRow {
                    symptoms: symptoms.iter().map(|s| Some(s.to_string())).collect(),
                    disease: disease.to_string(),
                });
            }
        }
        Dataset::new(
            vec!["symptom1".into(), "symptom2".into(), "symptom3".into()],
            rows,
        )
        .unwrap()
    }

    #[test]
    fn holds_out_a_fifth_and_reports_accuracy() {
        let artifacts = train(&dataset(10), TrainOptions::default()).unwrap();
        assert_eq!(artifacts.report.test_rows, 6);
        assert_eq!(artifacts.report.train_rows, 24);
        assert_eq!(artifacts.report.accuracy, Some(1.0));
        assert_eq!(artifacts.model.class_count(), 3);
    }

    #[test]
    fn same_seed_same_model() {
        let a = train(&dataset(5), TrainOptions::default()).unwrap();
        let b = train(&dataset(5), TrainOptions::default()).unwrap();
        assert_eq!(a.model, b.model);
    }

    #[test]
    fn partial_holdout_row_rounds_up() {
        let mut rows = dataset(3).rows().to_vec();
        rows.truncate(7);
        let dataset = Dataset::new(dataset(1).symptom_columns().to_vec(), rows).unwrap();
        let artifacts = train(&dataset, TrainOptions::default()).unwrap();
        assert_eq!(artifacts.report.test_rows, 2);
        assert_eq!(artifacts.report.train_rows, 5);
    }

    #[test]
    fn non_finite_alpha_is_rejected() {
        for alpha in [f64::INFINITY, f64::NAN] {
            let options = TrainOptions {
                alpha,
                ..TrainOptions::default()
            };
            assert!(matches!(
                train(&dataset(1), options).unwrap_err(),
                DatasetError::InvalidAlpha { .. }
            ));
        }
    }

    #[test]
    fn zero_test_fraction_fits_everything() {
        let options = TrainOptions {
            test_fraction: 0.0,
            ..TrainOptions::default()
        };
        let artifacts = train(&dataset(1), options).unwrap();
        assert_eq!(artifacts.report.train_rows, 3);
        assert_eq!(artifacts.report.accuracy, None);
    }

    #[test]
    fn holding_out_everything_is_an_error() {
        let options = TrainOptions {
            test_fraction: 1.0,
            ..TrainOptions::default()
        };
        assert!(matches!(
            train(&dataset(1), options).unwrap_err(),
            DatasetError::NoTrainingRows { rows: 3, .. }
        ));
    }
}
