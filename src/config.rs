//! Configuration management for the consensus engine

use crate::ensemble::support::DEFAULT_TOP_K;
use crate::types::assessment::AgreementThresholds;
use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Environment variable overriding the config file path
pub const CONFIG_PATH_ENV: &str = "BREED_CONSENSUS_CONFIG";

/// What to do when the upstream merged ranking disagrees with the local one
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MismatchPolicy {
    /// Log the disagreement and keep the local ranking
    #[default]
    Warn,
    /// Fail the evaluation
    Reject,
}

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub consensus: ConsensusConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Consensus analysis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ConsensusConfig {
    /// Top-K window for consensus support (default: 3)
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Agreement tier thresholds in percent
    #[serde(default)]
    pub thresholds: AgreementThresholds,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            thresholds: AgreementThresholds::default(),
        }
    }
}

/// Upstream cross-check configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default)]
    pub mismatch_policy: MismatchPolicy,
}

/// Metrics reporting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Seconds between periodic summaries (0 disables the reporter)
    #[serde(default = "default_report_interval")]
    pub report_interval_secs: u64,
}

fn default_report_interval() -> u64 {
    30
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            report_interval_secs: default_report_interval(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `$BREED_CONSENSUS_CONFIG` or `config/config.toml`
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config/config.toml".to_string());
        Self::load_from_path(path)
    }

    /// Load configuration from a specific path
    ///
    /// `BREED_CONSENSUS__SECTION__KEY` environment variables override file values.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix("BREED_CONSENSUS").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot honour
    pub fn validate(&self) -> Result<()> {
        let thresholds = &self.consensus.thresholds;

        if self.consensus.top_k == 0 {
            bail!("consensus.top_k must be at least 1");
        }
        for (name, value) in [("high", thresholds.high), ("moderate", thresholds.moderate)] {
            if !(0.0..=100.0).contains(&value) {
                bail!("consensus.thresholds.{} must be within [0, 100], got {}", name, value);
            }
        }
        if thresholds.moderate > thresholds.high {
            bail!(
                "consensus.thresholds.moderate ({}) exceeds consensus.thresholds.high ({})",
                thresholds.moderate,
                thresholds.high
            );
        }
        Ok(())
    }
}
