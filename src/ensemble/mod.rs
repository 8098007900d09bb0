//! Ensemble aggregation and consensus components

pub mod aggregator;
pub mod consensus;
pub mod engine;
pub mod support;

pub use aggregator::{aggregate, RankingAggregator};
pub use consensus::{analyze_consensus, ConsensusAnalyzer, ConsensusOutcome};
pub use engine::ConsensusEngine;
pub use support::{SupportTally, DEFAULT_TOP_K};
