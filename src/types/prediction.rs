//! Prediction records and per-model rankings

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Convert a confidence in [0, 1] to a percentage rounded to one decimal
/// place, ties to even.
pub fn round_percentage(confidence: f64) -> f64 {
    (confidence * 1000.0).round_ties_even() / 10.0
}

/// One (breed, confidence) observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Case-sensitive breed identifier
    pub breed: String,

    /// Confidence score (0.0 - 1.0)
    pub confidence: f64,

    /// Confidence as a percentage, one decimal place
    pub percentage: f64,

    /// Number of models whose top-K contains this breed (merged entries only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supporting_model_count: Option<u32>,
}

impl Prediction {
    /// Create a per-model prediction
    pub fn new(breed: impl Into<String>, confidence: f64) -> Self {
        Self {
            breed: breed.into(),
            confidence,
            percentage: round_percentage(confidence),
            supporting_model_count: None,
        }
    }

    /// Attach a supporting-model count (merged entries only)
    pub fn with_support(mut self, count: u32) -> Self {
        self.supporting_model_count = Some(count);
        self
    }

    fn validate(&self) -> EngineResult<()> {
        if self.breed.is_empty() {
            return Err(EngineError::validation("prediction has an empty breed"));
        }
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(EngineError::validation(format!(
                "confidence {} for breed '{}' is outside [0, 1]",
                self.confidence, self.breed
            )));
        }
        Ok(())
    }
}

/// Ordered predictions from a single model, highest confidence first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ModelRanking {
    predictions: Vec<Prediction>,
}

impl ModelRanking {
    /// Build a ranking, checking ordering and breed uniqueness.
    pub fn new(predictions: Vec<Prediction>) -> EngineResult<Self> {
        if predictions.is_empty() {
            return Err(EngineError::validation("model ranking is empty"));
        }

        let mut seen = HashSet::with_capacity(predictions.len());
        for prediction in &predictions {
            prediction.validate()?;
            if prediction.supporting_model_count.is_some() {
                return Err(EngineError::validation(format!(
                    "per-model prediction for '{}' carries a supporting model count",
                    prediction.breed
                )));
            }
            if !seen.insert(prediction.breed.as_str()) {
                return Err(EngineError::validation(format!(
                    "breed '{}' appears twice in one ranking",
                    prediction.breed
                )));
            }
        }

        if predictions
            .windows(2)
            .any(|pair| pair[0].confidence < pair[1].confidence)
        {
            return Err(EngineError::validation(
                "model ranking is not ordered by non-increasing confidence",
            ));
        }

        Ok(Self { predictions })
    }

    /// Build a ranking from (breed, confidence) pairs.
    pub fn from_pairs<S: Into<String>>(
        pairs: impl IntoIterator<Item = (S, f64)>,
    ) -> EngineResult<Self> {
        Self::new(
            pairs
                .into_iter()
                .map(|(breed, confidence)| Prediction::new(breed, confidence))
                .collect(),
        )
    }

    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    /// The model's own top-1 prediction
    pub fn top_prediction(&self) -> &Prediction {
        // Non-empty by construction
        &self.predictions[0]
    }

    /// The first `k` predictions (fewer if the ranking is shorter)
    pub fn top_k(&self, k: usize) -> &[Prediction] {
        &self.predictions[..k.min(self.predictions.len())]
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}

/// Per-model rankings for one inference request, keyed by model identifier.
///
/// Models are held in identifier order so every traversal, and therefore
/// every floating-point accumulation, is reproducible.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EnsembleInput {
    models: BTreeMap<String, ModelRanking>,
}

impl EnsembleInput {
    /// Build an ensemble input from (model id, ranking) pairs.
    pub fn new(models: impl IntoIterator<Item = (String, ModelRanking)>) -> EngineResult<Self> {
        let mut map = BTreeMap::new();
        for (model_id, ranking) in models {
            if model_id.is_empty() {
                return Err(EngineError::validation("model identifier is empty"));
            }
            if ranking.is_empty() {
                return Err(EngineError::validation(format!(
                    "model '{}' produced an empty ranking",
                    model_id
                )));
            }
            if map.insert(model_id.clone(), ranking).is_some() {
                return Err(EngineError::validation(format!(
                    "model '{}' supplied more than once",
                    model_id
                )));
            }
        }

        if map.is_empty() {
            return Err(EngineError::validation("ensemble input has no models"));
        }

        Ok(Self { models: map })
    }

    /// Iterate over (model id, ranking) in identifier order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelRanking)> {
        self.models.iter().map(|(id, ranking)| (id.as_str(), ranking))
    }

    pub fn model_ids(&self) -> Vec<String> {
        self.models.keys().cloned().collect()
    }

    pub fn ranking(&self, model_id: &str) -> Option<&ModelRanking> {
        self.models.get(model_id)
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }
}

/// Combined, deduplicated ranking across all models.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MergedRanking {
    entries: Vec<Prediction>,
}

impl MergedRanking {
    pub fn new(entries: Vec<Prediction>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[Prediction] {
        &self.entries
    }

    /// The leading merged entry, if any
    pub fn top(&self) -> Option<&Prediction> {
        self.entries.first()
    }

    /// The `n` best entries (fewer if the ranking is shorter)
    pub fn leading(&self, n: usize) -> &[Prediction] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// Position of a breed in the ranking
    pub fn position(&self, breed: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.breed == breed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
