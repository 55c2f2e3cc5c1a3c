// File: src/core/ranker.rs
use crate::core::encoder::EncoderStore;
use crate::core::types::{DiseaseCode, ProbabilityDistribution, RankedDisease, Ranking, TOP_K};

/// Disease codes ordered by descending probability, ties by ascending code.
/// O(M log M).
pub fn ranked_codes(distribution: &ProbabilityDistribution) -> Vec<DiseaseCode> {
    let probabilities = distribution.as_slice();
    let mut codes: Vec<DiseaseCode> = (0..probabilities.len() as DiseaseCode).collect();
    codes.sort_by(|&a, &b| {
        probabilities[b as usize]
            .total_cmp(&probabilities[a as usize])
            .then(a.cmp(&b))
    });
    codes
}

/// Turns a class distribution into the top-1 answer and the top-3 list.
///
/// # Panics
///
/// Panics on an empty distribution or a code the encoders cannot decode;
/// both mean the model does not belong to these encoders.
pub fn rank(distribution: &ProbabilityDistribution, store: &EncoderStore) -> Ranking {
    let top3: Vec<RankedDisease> = ranked_codes(distribution)
        .into_iter()
        .take(TOP_K)
        .map(|code| RankedDisease {
            disease: store.decode_disease(code).to_string(),
            percent: to_percent(distribution.get(code).unwrap_or(0.0)),
        })
        .collect();

    let Some(top1) = top3.first().cloned() else {
        panic!("classifier returned an empty distribution");
    };
    Ranking { top1, top3 }
}

fn to_percent(probability: f64) -> f64 {
    (probability * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::encoder::{LabelEncoder, SymptomEncoder};

    fn store(diseases: &[&str]) -> EncoderStore {
        EncoderStore::new(
            SymptomEncoder::fit(["Fever"]),
            LabelEncoder::fit(diseases.iter().copied()),
        )
    }

    fn dist(p: &[f64]) -> ProbabilityDistribution {
        ProbabilityDistribution::new(p.to_vec())
    }

    #[test]
    fn top3_is_sorted_descending_and_starts_with_top1() {
        let store = store(&["A", "B", "C", "D"]);
        let ranking = rank(&dist(&[0.1, 0.4, 0.2, 0.3]), &store);
        let names: Vec<&str> = ranking.top3.iter().map(|r| r.disease.as_str()).collect();
        assert_eq!(names, vec!["B", "D", "C"]);
        assert_eq!(ranking.top1, ranking.top3[0]);
        assert!((ranking.top1.percent - 40.0).abs() < 1e-9);
    }

    #[test]
    fn ties_break_by_ascending_code() {
        let store = store(&["A", "B", "C", "D"]);
        let ranking = rank(&dist(&[0.25, 0.25, 0.25, 0.25]), &store);
        let names: Vec<&str> = ranking.top3.iter().map(|r| r.disease.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(ranking, rank(&dist(&[0.25, 0.25, 0.25, 0.25]), &store));
    }

    #[test]
    fn fewer_than_three_classes_are_not_padded() {
        let store = store(&["A", "B"]);
        let ranking = rank(&dist(&[0.3, 0.7]), &store);
        assert_eq!(ranking.top3.len(), 2);
        assert_eq!(ranking.top1.disease, "B");
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn oversized_distribution_is_fatal() {
        let store = store(&["A"]);
        rank(&dist(&[0.1, 0.9]), &store);
    }
}
