//! Breed Consensus Engine Library
//!
//! Merges ranked breed predictions from independently trained classifiers
//! into a single ranking and measures how strongly the models agree.

pub mod config;
pub mod consumer;
pub mod ensemble;
pub mod error;
pub mod metrics;
pub mod producer;
pub mod types;

pub use config::AppConfig;
pub use consumer::ResponseConsumer;
pub use ensemble::{aggregate, analyze_consensus, ConsensusEngine};
pub use error::{EngineError, EngineResult};
pub use producer::ReportProducer;
pub use types::{
    AgreementAssessment, AgreementTier, ConsensusBreed, EnsembleInput, EnsembleReport,
    EnsembleResponse, MergedRanking, ModelRanking, Prediction,
};
