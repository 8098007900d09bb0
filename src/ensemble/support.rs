//! Top-K membership tally shared by aggregation and consensus analysis

use crate::types::prediction::EnsembleInput;
use std::collections::HashMap;

/// Default top-K window for consensus support
pub const DEFAULT_TOP_K: usize = 3;

/// Per-breed count of distinct models whose top-K contains the breed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportTally {
    top_k: usize,
    counts: HashMap<String, u32>,
}

impl SupportTally {
    /// Count top-K membership across every model in the ensemble.
    pub fn from_input(input: &EnsembleInput, top_k: usize) -> Self {
        let mut counts: HashMap<String, u32> = HashMap::new();

        for (_, ranking) in input.iter() {
            // Breeds are unique within a ranking, so each model counts once per breed
            for prediction in ranking.top_k(top_k) {
                *counts.entry(prediction.breed.clone()).or_insert(0) += 1;
            }
        }

        Self { top_k, counts }
    }

    /// Support for a breed (0 if no model placed it in its top-K)
    pub fn count(&self, breed: &str) -> u32 {
        self.counts.get(breed).copied().unwrap_or(0)
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Breeds backed by at least two models
    pub fn corroborated(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts
            .iter()
            .filter(|(_, &count)| count > 1)
            .map(|(breed, &count)| (breed.as_str(), count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::prediction::ModelRanking;

    fn ensemble(models: &[(&str, &[(&str, f64)])]) -> EnsembleInput {
        EnsembleInput::new(models.iter().map(|(id, pairs)| {
            (
                id.to_string(),
                ModelRanking::from_pairs(pairs.iter().copied()).unwrap(),
            )
        }))
        .unwrap()
    }

    #[test]
    fn test_tally_counts_only_top_k() {
        let input = ensemble(&[
            (
                "m1",
                &[("Pug", 0.5), ("Boxer", 0.2), ("Akita", 0.1), ("Beagle", 0.05)],
            ),
            ("m2", &[("Beagle", 0.6), ("Pug", 0.3)]),
        ]);

        let tally = SupportTally::from_input(&input, DEFAULT_TOP_K);

        assert_eq!(tally.count("Pug"), 2);
        // Fourth place for m1 falls outside the window
        assert_eq!(tally.count("Beagle"), 1);
        assert_eq!(tally.count("Boxer"), 1);
        assert_eq!(tally.count("Collie"), 0);
        assert_eq!(tally.top_k(), 3);

        let corroborated: Vec<_> = tally.corroborated().collect();
        assert_eq!(corroborated, vec![("Pug", 2)]);
    }

    #[test]
    fn test_tally_with_wider_window() {
        let input = ensemble(&[
            (
                "m1",
                &[("Pug", 0.5), ("Boxer", 0.2), ("Akita", 0.1), ("Beagle", 0.05)],
            ),
            ("m2", &[("Beagle", 0.6), ("Pug", 0.3)]),
        ]);

        let tally = SupportTally::from_input(&input, 4);
        assert_eq!(tally.count("Beagle"), 2);
    }
}
