use crate::config::DxConfig;
use crate::core::assembler::assemble;
use crate::core::encoder::EncoderStore;
use crate::core::model::Classifier;
use crate::core::ranker::rank;
use crate::core::types::{Diagnosis, MIN_SYMPTOMS};
use crate::error::{InsufficientSymptoms, LoadError, ModelLoadError, PredictError};
use crate::history::{HistorySink, NewPrediction};
use crate::logging::redact_symptoms;
use crate::persistence::{load_encoders, load_model};

/// The loaded, read-only inference state.
struct Inference {
    store: EncoderStore,
    model: Box<dyn Classifier>,
}

/// Process-wide diagnosis engine.
///
/// Encoders are loaded before the model, and both are immutable afterwards,
/// so one engine can be shared (e.g. behind an `Arc`) by any number of
/// concurrent callers without locking. When either artifact fails to load the
/// engine still exists but every prediction fails with
/// [`PredictError::Unavailable`].
pub struct DiagnosisEngine {
    inference: Result<Inference, LoadError>,
}

impl DiagnosisEngine {
    /// Loads encoders then model from the configured paths. Never fails;
    /// load errors leave the engine degraded.
    pub fn load(config: &DxConfig) -> Self {
        let loaded = load_encoders(&config.encoders_path)
            .map_err(LoadError::from)
            .and_then(|store| {
                let model = load_model(&config.model_path)?;
                Ok((store, model))
            });

        match loaded {
            Ok((store, model)) => Self::from_parts(store, Box::new(model)),
            Err(err) => Self::unavailable(err),
        }
    }

    /// Builds an engine from already loaded parts, checking that the model
    /// was fitted against these encoders.
    pub fn from_parts(store: EncoderStore, model: Box<dyn Classifier>) -> Self {
        if model.class_count() != store.disease_count()
            || model.symptom_count() != store.symptom_count()
        {
            return Self::unavailable(
                ModelLoadError::Mismatch {
                    model_diseases: model.class_count(),
                    model_symptoms: model.symptom_count(),
                    encoder_diseases: store.disease_count(),
                    encoder_symptoms: store.symptom_count(),
                }
                .into(),
            );
        }
        tracing::info!(
            diseases = store.disease_count(),
            symptoms = store.symptom_count(),
            "inference ready"
        );
        Self {
            inference: Ok(Inference { store, model }),
        }
    }

    pub fn unavailable(err: LoadError) -> Self {
        tracing::error!(error = %err, "inference unavailable");
        Self { inference: Err(err) }
    }

    pub fn is_available(&self) -> bool {
        self.inference.is_ok()
    }

    pub fn unavailable_reason(&self) -> Option<&LoadError> {
        self.inference.as_ref().err()
    }

    pub fn encoders(&self) -> Option<&EncoderStore> {
        self.inference.as_ref().ok().map(|inference| &inference.store)
    }

    /// Selectable symptom names; empty while degraded.
    pub fn symptoms(&self) -> Vec<&str> {
        self.encoders().map(EncoderStore::symptoms).unwrap_or_default()
    }

    /// Runs assemble, score and rank for one request.
    pub fn predict<S: AsRef<str>>(&self, symptoms: &[S]) -> Result<Diagnosis, PredictError> {
        if symptoms.len() < MIN_SYMPTOMS {
            return Err(InsufficientSymptoms {
                given: symptoms.len(),
                required: MIN_SYMPTOMS,
            }
            .into());
        }
        let inference = self
            .inference
            .as_ref()
            .map_err(|err| PredictError::Unavailable {
                reason: err.to_string(),
            })?;

        let features = assemble(symptoms, &inference.store)?;
        let distribution = inference.model.score(&features);
        let ranking = rank(&distribution, &inference.store);

        tracing::debug!(
            symptoms = %redact_symptoms(symptoms),
            disease = %ranking.top1.disease,
            percent = ranking.top1.percent,
            "predicted"
        );
        let symptoms = symptoms.iter().map(|s| s.as_ref().to_string()).collect();
        Ok(Diagnosis::new(symptoms, ranking))
    }

    /// Like [`predict`](Self::predict), then appends the result to `sink`.
    /// A failed append is logged and does not fail the prediction.
    pub fn predict_and_record<S: AsRef<str>>(
        &self,
        symptoms: &[S],
        sink: &dyn HistorySink,
    ) -> Result<Diagnosis, PredictError> {
        let diagnosis = self.predict(symptoms)?;
        if let Err(err) = sink.append(&NewPrediction::from_diagnosis(&diagnosis)) {
            tracing::warn!(error = %err, "failed to record prediction history");
        }
        Ok(diagnosis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::encoder::{LabelEncoder, SymptomEncoder};
    use crate::core::types::{FeatureVector, ProbabilityDistribution};
    use crate::error::HistoryError;
    use std::cell::RefCell;

    /// Returns the same distribution for every input.
    struct Fixed(Vec<f64>, usize);

    impl Classifier for Fixed {
        fn class_count(&self) -> usize {
            self.0.len()
        }
        fn symptom_count(&self) -> usize {
            self.1
        }
        fn score(&self, _: &FeatureVector) -> ProbabilityDistribution {
            ProbabilityDistribution::new(self.0.clone())
        }
    }

    fn store() -> EncoderStore {
        EncoderStore::new(
            SymptomEncoder::fit(["Fever", "Cough", "Sneeze"]),
            LabelEncoder::fit(["Flu", "Cold", "Allergy"]),
        )
    }

    fn engine() -> DiagnosisEngine {
        DiagnosisEngine::from_parts(store(), Box::new(Fixed(vec![0.2, 0.3, 0.5], 4)))
    }

    #[derive(Default)]
    struct Recorder(RefCell<Vec<NewPrediction>>);

    impl HistorySink for Recorder {
        fn append(&self, prediction: &NewPrediction) -> Result<(), HistoryError> {
            self.0.borrow_mut().push(prediction.clone());
            Ok(())
        }
    }

    struct Broken;

    impl HistorySink for Broken {
        fn append(&self, _: &NewPrediction) -> Result<(), HistoryError> {
            Err(HistoryError::Sqlite(rusqlite::Error::InvalidQuery))
        }
    }

    #[test]
    fn predicts_top_class_as_percentage() {
        let diagnosis = engine().predict(&["Fever", "Cough", "Sneeze"]).unwrap();
        assert_eq!(diagnosis.predicted_disease, "Flu");
        assert!((diagnosis.probability - 50.0).abs() < 1e-9);
        let names: Vec<&str> = diagnosis.top3.iter().map(|r| r.disease.as_str()).collect();
        assert_eq!(names, vec!["Flu", "Cold", "Allergy"]);
    }

    #[test]
    fn count_is_checked_before_availability() {
        let degraded = DiagnosisEngine::unavailable(
            ModelLoadError::NotFound {
                path: "model.bin".into(),
            }
            .into(),
        );
        assert!(matches!(
            degraded.predict(&["Fever"]),
            Err(PredictError::InsufficientSymptoms(_))
        ));
        assert!(matches!(
            degraded.predict(&["Fever", "Cough", "Sneeze"]),
            Err(PredictError::Unavailable { .. })
        ));
        assert!(degraded.symptoms().is_empty());
    }

    #[test]
    fn mismatched_model_degrades_engine() {
        let engine = DiagnosisEngine::from_parts(store(), Box::new(Fixed(vec![0.5, 0.5], 4)));
        assert!(!engine.is_available());
        assert!(matches!(
            engine.unavailable_reason(),
            Some(LoadError::Model(ModelLoadError::Mismatch { .. }))
        ));
    }

    #[test]
    fn records_successful_predictions() {
        let recorder = Recorder::default();
        engine()
            .predict_and_record(&["Fever", "Cough", "Sneeze"], &recorder)
            .unwrap();
        let recorded = recorder.0.borrow();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].symptoms, "Fever, Cough, Sneeze");
        assert_eq!(recorded[0].predicted_disease, "Flu");
    }

    #[test]
    fn history_failure_does_not_fail_prediction() {
        let diagnosis = engine()
            .predict_and_record(&["Fever", "Cough", "Sneeze"], &Broken)
            .unwrap();
        assert_eq!(diagnosis.predicted_disease, "Flu");
    }

    #[test]
    fn rejected_requests_are_not_recorded() {
        let recorder = Recorder::default();
        assert!(engine().predict_and_record(&["Fever"], &recorder).is_err());
        assert!(recorder.0.borrow().is_empty());
    }
}
