//! Type definitions for the consensus engine

pub mod assessment;
pub mod prediction;
pub mod response;

pub use assessment::{
    AgreementAssessment, AgreementThresholds, AgreementTier, ConsensusBreed, EnsembleReport,
    UpstreamCheck,
};
pub use prediction::{round_percentage, EnsembleInput, MergedRanking, ModelRanking, Prediction};
pub use response::{EnsembleResponse, WirePrediction};
