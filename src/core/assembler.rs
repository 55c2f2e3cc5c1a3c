// File: src/core/assembler.rs
use crate::core::encoder::EncoderStore;
use crate::core::types::{FeatureVector, MIN_SYMPTOMS, SLOT_COUNT};
use crate::error::InsufficientSymptoms;

/// Encodes a caller's ordered symptom selection into the fixed 4-slot vector.
///
/// The first `SLOT_COUNT` names fill the slots in the given order; extra names
/// are ignored and missing slots carry the sentinel code. Names outside the
/// vocabulary also encode as the sentinel.
pub fn assemble<S: AsRef<str>>(
    symptoms: &[S],
    store: &EncoderStore,
) -> Result<FeatureVector, InsufficientSymptoms> {
    if symptoms.len() < MIN_SYMPTOMS {
        return Err(InsufficientSymptoms {
            given: symptoms.len(),
            required: MIN_SYMPTOMS,
        });
    }
    if symptoms.len() > SLOT_COUNT {
        tracing::debug!(
            given = symptoms.len(),
            used = SLOT_COUNT,
            "ignoring symptoms beyond the last slot"
        );
    }

    let mut slots = [store.sentinel_code(); SLOT_COUNT];
    for (slot, name) in slots.iter_mut().zip(symptoms) {
        *slot = store.encode_symptom(name.as_ref());
    }
    Ok(FeatureVector(slots))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::encoder::{LabelEncoder, SymptomEncoder};

    fn store() -> EncoderStore {
        EncoderStore::new(
            SymptomEncoder::fit(["Fever", "Cough", "Sneeze", "Headache", "Rash"]),
            LabelEncoder::fit(["Flu", "Cold", "Allergy"]),
        )
    }

    #[test]
    fn three_symptoms_pad_last_slot() {
        let store = store();
        let vector = assemble(&["Fever", "Cough", "Sneeze"], &store).unwrap();
        assert_eq!(
            vector.slots(),
            &[
                store.encode_symptom("Fever"),
                store.encode_symptom("Cough"),
                store.encode_symptom("Sneeze"),
                store.sentinel_code(),
            ]
        );
    }

    #[test]
    fn extras_beyond_four_are_ignored() {
        let store = store();
        let four = assemble(&["Fever", "Cough", "Sneeze", "Headache"], &store).unwrap();
        let five = assemble(&["Fever", "Cough", "Sneeze", "Headache", "Rash"], &store).unwrap();
        assert_eq!(four, five);
    }

    #[test]
    fn order_is_preserved_and_duplicates_kept() {
        let store = store();
        let vector = assemble(&["Cough", "Fever", "Cough"], &store).unwrap();
        let cough = store.encode_symptom("Cough");
        assert_eq!(vector.slots()[0], cough);
        assert_eq!(vector.slots()[1], store.encode_symptom("Fever"));
        assert_eq!(vector.slots()[2], cough);
    }

    #[test]
    fn too_few_symptoms_is_an_error() {
        let err = assemble(&["Fever", "Cough"], &store()).unwrap_err();
        assert_eq!(err.given, 2);
        assert_eq!(err.required, 3);
        assert!(assemble::<&str>(&[], &store()).is_err());
    }

    #[test]
    fn unknown_symptom_matches_explicit_sentinel() {
        let store = store();
        let unknown = assemble(&["Fever", "Cough", "UnknownSymptomXYZ"], &store).unwrap();
        let none = assemble(&["Fever", "Cough", "None"], &store).unwrap();
        assert_eq!(unknown.slots()[2], none.slots()[2]);
        assert_eq!(unknown, none);
    }
}
