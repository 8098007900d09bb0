//! Consensus and agreement analysis across ensemble members

use crate::ensemble::support::{SupportTally, DEFAULT_TOP_K};
use crate::error::{EngineError, EngineResult};
use crate::types::assessment::{
    AgreementAssessment, AgreementThresholds, AgreementTier, ConsensusBreed,
};
use crate::types::prediction::{EnsembleInput, MergedRanking};
use tracing::debug;

/// Consensus breeds plus the agreement tier for one ensemble response.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsensusOutcome {
    pub consensus: Vec<ConsensusBreed>,
    pub agreement: AgreementAssessment,
}

/// Derives cross-model consensus from per-model rankings and a merged ranking.
pub struct ConsensusAnalyzer {
    top_k: usize,
    thresholds: AgreementThresholds,
}

impl ConsensusAnalyzer {
    pub fn new(top_k: usize, thresholds: AgreementThresholds) -> Self {
        Self { top_k, thresholds }
    }

    /// Compute the consensus set and the agreement assessment.
    pub fn analyze(
        &self,
        input: &EnsembleInput,
        merged: &MergedRanking,
    ) -> EngineResult<ConsensusOutcome> {
        let tally = SupportTally::from_input(input, self.top_k);
        self.analyze_with_tally(input, merged, &tally)
    }

    /// Same as [`analyze`](Self::analyze) with a precomputed tally.
    pub fn analyze_with_tally(
        &self,
        input: &EnsembleInput,
        merged: &MergedRanking,
        tally: &SupportTally,
    ) -> EngineResult<ConsensusOutcome> {
        let consensus = Self::consensus_breeds(merged, tally);
        let agreement = self.assess_agreement(input, merged, consensus.is_empty())?;

        debug!(
            consensus_breeds = consensus.len(),
            tier = ?agreement.tier,
            agreement_pct = agreement.agreement_percentage,
            "Consensus analysis complete"
        );

        Ok(ConsensusOutcome {
            consensus,
            agreement,
        })
    }

    /// Breeds with support from two or more models, strongest first.
    ///
    /// Ties fall back to merged-ranking position, then breed name.
    fn consensus_breeds(merged: &MergedRanking, tally: &SupportTally) -> Vec<ConsensusBreed> {
        let mut breeds: Vec<(ConsensusBreed, usize)> = tally
            .corroborated()
            .map(|(breed, count)| {
                let position = merged.position(breed).unwrap_or(usize::MAX);
                (
                    ConsensusBreed {
                        breed: breed.to_string(),
                        support_count: count,
                    },
                    position,
                )
            })
            .collect();

        breeds.sort_by(|(a, a_pos), (b, b_pos)| {
            b.support_count
                .cmp(&a.support_count)
                .then_with(|| a_pos.cmp(b_pos))
                .then_with(|| a.breed.cmp(&b.breed))
        });

        breeds.into_iter().map(|(breed, _)| breed).collect()
    }

    fn assess_agreement(
        &self,
        input: &EnsembleInput,
        merged: &MergedRanking,
        no_consensus: bool,
    ) -> EngineResult<AgreementAssessment> {
        let top_breed = &merged.top().ok_or(EngineError::EmptyRanking)?.breed;

        // No breed gathered cross-model support: treat as no usable agreement
        if no_consensus {
            return Ok(AgreementAssessment::no_consensus());
        }

        let matching = input
            .iter()
            .filter(|(_, ranking)| ranking.top_prediction().breed == *top_breed)
            .count();
        let agreement_percentage = 100.0 * matching as f64 / input.model_count() as f64;

        Ok(AgreementAssessment {
            tier: AgreementTier::from_percentage(agreement_percentage, &self.thresholds),
            agreement_percentage,
        })
    }
}

impl Default for ConsensusAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_K, AgreementThresholds::default())
    }
}

/// Analyze consensus with the default top-3 window and 66/33 thresholds.
pub fn analyze_consensus(
    input: &EnsembleInput,
    merged: &MergedRanking,
) -> EngineResult<ConsensusOutcome> {
    ConsensusAnalyzer::default().analyze(input, merged)
}
