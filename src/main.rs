//! Breed Consensus Engine - Main Entry Point
//!
//! Reads upstream ensemble responses (one JSON document per line) from stdin,
//! evaluates each one, and writes one report per line to stdout.

use anyhow::Result;
use breed_consensus::{
    config::{AppConfig, LoggingConfig},
    consumer::{ConsumedLine, ResponseConsumer},
    ensemble::ConsensusEngine,
    metrics::{EngineMetrics, MetricsReporter},
    producer::ReportProducer,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{stdin, stdout, AsyncBufRead, AsyncWrite, BufReader, BufWriter};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))?;

    // stdout carries the report stream
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    info!("Starting Breed Consensus Engine");
    info!(
        top_k = config.consensus.top_k,
        high = config.consensus.thresholds.high,
        moderate = config.consensus.thresholds.moderate,
        mismatch_policy = ?config.upstream.mismatch_policy,
        "Configuration loaded"
    );

    let engine = ConsensusEngine::new(&config);
    let metrics = Arc::new(EngineMetrics::new());

    if config.metrics.report_interval_secs > 0 {
        let reporter = MetricsReporter::new(metrics.clone(), config.metrics.report_interval_secs);
        tokio::spawn(reporter.start());
    }

    let mut consumer = ResponseConsumer::new(BufReader::new(stdin()));
    let mut producer = ReportProducer::new(BufWriter::new(stdout()));

    let outcome = run(&engine, &metrics, &mut consumer, &mut producer).await;

    // Reports already written must reach stdout even if the loop failed
    if let Err(e) = producer.flush().await {
        error!(error = %e, "Failed to flush report stream");
    }

    match &outcome {
        Ok(()) => info!("Input exhausted, shutting down..."),
        Err(e) => error!(error = %e, "Pipeline stopped early"),
    }
    metrics.print_summary();

    outcome
}

async fn run<R, W>(
    engine: &ConsensusEngine,
    metrics: &EngineMetrics,
    consumer: &mut ResponseConsumer<R>,
    producer: &mut ReportProducer<W>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    while let Some(consumed) = consumer.next().await? {
        let response = match consumed {
            ConsumedLine::Response(response) => response,
            ConsumedLine::Malformed { line_number, error } => {
                warn!(line_number, error = %error, "Failed to deserialize ensemble response");
                metrics.record_failure("malformed_json");
                continue;
            }
        };

        let request_id = response.request_id.clone().unwrap_or_default();
        let start_time = Instant::now();

        match engine.evaluate_response(response) {
            Ok(report) => {
                let processing_time = start_time.elapsed();
                metrics.record_report(&report, processing_time);

                debug!(
                    request_id = %request_id,
                    report_id = %report.report_id,
                    tier = ?report.agreement.tier,
                    agreement_pct = report.agreement.agreement_percentage,
                    processing_time_us = processing_time.as_micros(),
                    "Ensemble report produced"
                );

                if let Err(e) = producer.publish(&report).await {
                    error!(report_id = %report.report_id, error = %e, "Failed to publish report");
                    return Err(e);
                }
            }
            Err(e) => {
                metrics.record_error(&e);
                error!(
                    request_id = %request_id,
                    line_number = consumer.line_number(),
                    kind = e.kind(),
                    error = %e,
                    "Ensemble evaluation failed"
                );
            }
        }
    }

    Ok(())
}
