//! Consensus engine: aggregation, consensus analysis and upstream cross-check

use crate::config::{AppConfig, MismatchPolicy};
use crate::ensemble::aggregator::RankingAggregator;
use crate::ensemble::consensus::ConsensusAnalyzer;
use crate::ensemble::support::{SupportTally, DEFAULT_TOP_K};
use crate::error::{EngineError, EngineResult};
use crate::types::assessment::{AgreementThresholds, EnsembleReport, UpstreamCheck};
use crate::types::prediction::{EnsembleInput, MergedRanking};
use crate::types::response::EnsembleResponse;
use tracing::{debug, warn};

/// Produces a complete [`EnsembleReport`] for one ensemble response.
///
/// Either every output is produced consistently or the call fails; there is
/// no partial result.
pub struct ConsensusEngine {
    top_k: usize,
    aggregator: RankingAggregator,
    analyzer: ConsensusAnalyzer,
    mismatch_policy: MismatchPolicy,
}

impl ConsensusEngine {
    /// Create an engine from configuration
    pub fn new(config: &AppConfig) -> Self {
        Self::with_settings(
            config.consensus.top_k,
            config.consensus.thresholds.clone(),
            config.upstream.mismatch_policy,
        )
    }

    pub fn with_settings(
        top_k: usize,
        thresholds: AgreementThresholds,
        mismatch_policy: MismatchPolicy,
    ) -> Self {
        Self {
            top_k,
            aggregator: RankingAggregator::new(top_k),
            analyzer: ConsensusAnalyzer::new(top_k, thresholds),
            mismatch_policy,
        }
    }

    pub fn mismatch_policy(&self) -> MismatchPolicy {
        self.mismatch_policy
    }

    /// Evaluate an ensemble, optionally cross-checking an upstream merged ranking.
    pub fn evaluate(
        &self,
        input: &EnsembleInput,
        upstream: Option<&MergedRanking>,
    ) -> EngineResult<EnsembleReport> {
        // One tally feeds both the merged annotations and the consensus set
        let tally = SupportTally::from_input(input, self.top_k);

        let merged = self.aggregator.aggregate_with_tally(input, &tally);
        let outcome = self.analyzer.analyze_with_tally(input, &merged, &tally)?;

        let upstream_check = match upstream {
            Some(upstream) => Some(self.cross_check(upstream, &merged)?),
            None => None,
        };

        debug!(
            models = input.model_count(),
            tier = ?outcome.agreement.tier,
            consensus_breeds = outcome.consensus.len(),
            "Ensemble evaluated"
        );

        Ok(EnsembleReport::new(
            input.model_ids(),
            merged,
            outcome.consensus,
            outcome.agreement,
        )
        .with_upstream_check(upstream_check))
    }

    /// Decode an upstream response and evaluate it.
    pub fn evaluate_response(&self, response: EnsembleResponse) -> EngineResult<EnsembleReport> {
        let request_id = response.request_id.clone();
        let (input, upstream) = response.into_parts()?;

        Ok(self
            .evaluate(&input, upstream.as_ref())?
            .with_request_id(request_id))
    }

    /// Compare the upstream top entry with the locally computed one.
    fn cross_check(&self, upstream: &MergedRanking, local: &MergedRanking) -> EngineResult<UpstreamCheck> {
        let local_top = local
            .top()
            .map(|p| p.breed.clone())
            .ok_or(EngineError::EmptyRanking)?;
        let upstream_top = upstream.top().map(|p| p.breed.clone());
        let agrees = upstream_top.as_deref() == Some(local_top.as_str());

        if !agrees {
            let upstream_label = upstream_top.clone().unwrap_or_default();
            match self.mismatch_policy {
                MismatchPolicy::Warn => {
                    warn!(
                        upstream_top = %upstream_label,
                        local_top = %local_top,
                        "Upstream merged ranking disagrees with local aggregation"
                    );
                }
                MismatchPolicy::Reject => {
                    return Err(EngineError::UpstreamMismatch {
                        upstream: upstream_label,
                        local: local_top,
                    });
                }
            }
        }

        Ok(UpstreamCheck {
            upstream_top,
            local_top,
            agrees,
        })
    }
}

impl Default for ConsensusEngine {
    fn default() -> Self {
        Self::with_settings(
            DEFAULT_TOP_K,
            AgreementThresholds::default(),
            MismatchPolicy::default(),
        )
    }
}
