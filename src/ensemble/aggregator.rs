//! Ranking aggregation for the multi-model ensemble

use crate::ensemble::support::{SupportTally, DEFAULT_TOP_K};
use crate::error::EngineResult;
use crate::types::prediction::{EnsembleInput, MergedRanking, Prediction};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// Running sum of the confidences a breed received.
#[derive(Debug, Default)]
struct BreedScore {
    total: f64,
    contributors: u32,
}

/// Merges per-model rankings into one deduplicated ranking.
///
/// A breed's merged confidence is the mean over the models that listed it;
/// models that never list a breed are left out of its average.
pub struct RankingAggregator {
    /// Window used for the supporting-model annotation
    top_k: usize,
}

impl RankingAggregator {
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }

    /// Aggregate all model rankings into a merged ranking.
    pub fn aggregate(&self, input: &EnsembleInput) -> EngineResult<MergedRanking> {
        let tally = SupportTally::from_input(input, self.top_k);
        Ok(self.aggregate_with_tally(input, &tally))
    }

    /// Aggregate using a precomputed support tally.
    pub fn aggregate_with_tally(&self, input: &EnsembleInput, tally: &SupportTally) -> MergedRanking {
        let mut scores: HashMap<&str, BreedScore> = HashMap::new();

        for (_, ranking) in input.iter() {
            for prediction in ranking.predictions() {
                let score = scores.entry(prediction.breed.as_str()).or_default();
                score.total += prediction.confidence;
                score.contributors += 1;
            }
        }

        let mut merged: Vec<(&str, f64, u32)> = scores
            .into_iter()
            .map(|(breed, score)| (breed, score.total / score.contributors as f64, score.contributors))
            .collect();

        merged.sort_by(|a, b| Self::rank_order(a, b));

        let entries: Vec<Prediction> = merged
            .into_iter()
            .map(|(breed, confidence, _)| {
                Prediction::new(breed, confidence).with_support(tally.count(breed))
            })
            .collect();

        debug!(
            models = input.model_count(),
            breeds = entries.len(),
            top = entries.first().map(|p| p.breed.as_str()).unwrap_or(""),
            "Rankings aggregated"
        );

        MergedRanking::new(entries)
    }

    /// Confidence descending, then contributor count descending, then name ascending.
    fn rank_order(a: &(&str, f64, u32), b: &(&str, f64, u32)) -> Ordering {
        b.1.total_cmp(&a.1)
            .then_with(|| b.2.cmp(&a.2))
            .then_with(|| a.0.cmp(b.0))
    }
}

impl Default for RankingAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_K)
    }
}

/// Aggregate with the default top-3 support window.
pub fn aggregate(input: &EnsembleInput) -> EngineResult<MergedRanking> {
    RankingAggregator::default().aggregate(input)
}
