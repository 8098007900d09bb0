//! Sample Response Generator
//!
//! Emits synthetic upstream ensemble responses as newline-delimited JSON for
//! exercising the consensus pipeline.
//!
//! Usage: sample-responses [count] [agreement_rate] [models]

use breed_consensus::types::{EnsembleResponse, WirePrediction};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use std::io::Write;
use tracing::info;

const BREEDS: &[&str] = &[
    "Beagle",
    "Border Collie",
    "Boxer",
    "Chihuahua",
    "Dachshund",
    "German Shepherd",
    "Golden Retriever",
    "Labrador Retriever",
    "Maltese",
    "Poodle",
    "Pug",
    "Samoyed",
    "Shiba Inu",
    "Siberian Husky",
    "Yorkshire Terrier",
];

const MODEL_NAMES: &[&str] = &["resnet50", "efficientnet", "scratch_cnn", "azure_vision", "vit"];

/// Synthetic response generator
struct ResponseGenerator {
    rng: rand::rngs::ThreadRng,
    request_counter: u64,
    models: Vec<String>,
}

impl ResponseGenerator {
    fn new(model_count: usize) -> Self {
        Self {
            rng: rand::thread_rng(),
            request_counter: 0,
            models: MODEL_NAMES
                .iter()
                .take(model_count.clamp(1, MODEL_NAMES.len()))
                .map(|m| m.to_string())
                .collect(),
        }
    }

    /// Generate one response; `agreeing` models share a common top breed
    fn generate(&mut self, agreement_rate: f64) -> EnsembleResponse {
        self.request_counter += 1;
        let shared_breed = *BREEDS.choose(&mut self.rng).unwrap_or(&"Beagle");

        let mut model_predictions = HashMap::new();
        for model in self.models.clone() {
            let agrees = self.rng.gen_bool(agreement_rate);
            model_predictions.insert(model, self.ranking(agrees.then_some(shared_breed)));
        }

        EnsembleResponse {
            success: true,
            request_id: Some(format!("req_{:08}", self.request_counter)),
            models_used: self.models.clone(),
            model_predictions,
            aggregated_results: Vec::new(),
        }
    }

    /// Top-3 predictions with descending confidences
    fn ranking(&mut self, leading: Option<&str>) -> Vec<WirePrediction> {
        let mut breeds: Vec<&str> = BREEDS
            .choose_multiple(&mut self.rng, 3)
            .copied()
            .filter(|b| Some(*b) != leading)
            .collect();
        if let Some(leading) = leading {
            breeds.insert(0, leading);
        }
        breeds.truncate(3);

        let mut remaining = 1.0;
        breeds
            .into_iter()
            .map(|breed| {
                let confidence: f64 = remaining * self.rng.gen_range(0.5..0.95);
                remaining -= confidence;
                WirePrediction {
                    breed: breed.to_string(),
                    confidence,
                    percentage: Some((confidence * 10000.0).round() / 100.0),
                    model_count: None,
                }
            })
            .collect()
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sample_responses=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let count: u64 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(100);
    let agreement_rate: f64 = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.6_f64)
        .clamp(0.0, 1.0);
    let models: usize = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(3);

    info!(count, agreement_rate, models, "Generating sample responses");

    let mut generator = ResponseGenerator::new(models);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for _ in 0..count {
        let response = generator.generate(agreement_rate);
        serde_json::to_writer(&mut out, &response)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    info!("Completed! Generated {} responses", count);
    Ok(())
}
