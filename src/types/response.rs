//! Upstream classification service response format

use crate::error::{EngineError, EngineResult};
use crate::types::prediction::{EnsembleInput, MergedRanking, ModelRanking, Prediction};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// One breed prediction as emitted by the classification service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WirePrediction {
    pub breed: String,
    pub confidence: f64,

    /// Percentage as computed upstream (recomputed locally)
    #[serde(default)]
    pub percentage: Option<f64>,

    /// Upstream contribution count on aggregated entries (informational only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_count: Option<u32>,
}

/// Full ensemble response from the classification service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleResponse {
    #[serde(default = "default_success")]
    pub success: bool,

    /// Optional request identifier for correlating reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// Per-model ranked predictions
    pub model_predictions: HashMap<String, Vec<WirePrediction>>,

    /// Upstream merged ranking, if the service computed one
    #[serde(default)]
    pub aggregated_results: Vec<WirePrediction>,

    #[serde(default)]
    pub models_used: Vec<String>,
}

fn default_success() -> bool {
    true
}

impl EnsembleResponse {
    /// Split the response into validated engine input and the optional
    /// upstream merged ranking.
    pub fn into_parts(self) -> EngineResult<(EnsembleInput, Option<MergedRanking>)> {
        if !self.success {
            return Err(EngineError::validation(
                "upstream response is flagged unsuccessful",
            ));
        }

        let mut models = Vec::with_capacity(self.model_predictions.len());
        for (model_id, predictions) in self.model_predictions {
            if predictions.is_empty() {
                warn!(model = %model_id, "Model returned no predictions, skipping");
                continue;
            }

            let mut predictions: Vec<Prediction> = predictions
                .into_iter()
                .map(|p| Prediction::new(p.breed, p.confidence))
                .collect();
            // Some upstream models emit labels in class order rather than by score
            predictions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

            let ranking = ModelRanking::new(predictions).map_err(|e| match e {
                EngineError::Validation(msg) => {
                    EngineError::Validation(format!("model '{}': {}", model_id, msg))
                }
                other => other,
            })?;
            models.push((model_id, ranking));
        }

        let input = EnsembleInput::new(models)?;

        let upstream = if self.aggregated_results.is_empty() {
            None
        } else {
            // model_count upstream counts contributors, not top-K support
            let entries = self
                .aggregated_results
                .into_iter()
                .map(|p| Prediction::new(p.breed, p.confidence))
                .collect();
            Some(MergedRanking::new(entries))
        };

        Ok((input, upstream))
    }
}
