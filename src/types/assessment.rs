//! Consensus and agreement output structures

use crate::types::prediction::MergedRanking;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Agreement tier classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AgreementTier {
    Low,
    Moderate,
    High,
}

impl AgreementTier {
    /// Determine the tier from an agreement percentage and thresholds
    pub fn from_percentage(percentage: f64, thresholds: &AgreementThresholds) -> Self {
        if percentage >= thresholds.high {
            AgreementTier::High
        } else if percentage >= thresholds.moderate {
            AgreementTier::Moderate
        } else {
            AgreementTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgreementTier::Low => "LOW",
            AgreementTier::Moderate => "MODERATE",
            AgreementTier::High => "HIGH",
        }
    }
}

/// Configurable agreement tier thresholds (percentages, inclusive lower bounds)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgreementThresholds {
    pub high: f64,
    pub moderate: f64,
}

impl Default for AgreementThresholds {
    fn default() -> Self {
        Self {
            high: 66.0,
            moderate: 33.0,
        }
    }
}

/// A breed found in more than one model's top-K
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusBreed {
    pub breed: String,
    pub support_count: u32,
}

impl ConsensusBreed {
    /// Share of the ensemble backing this breed (0.0 - 1.0)
    pub fn support_fraction(&self, total_models: usize) -> f64 {
        if total_models == 0 {
            return 0.0;
        }
        self.support_count as f64 / total_models as f64
    }
}

/// How strongly the models agree on the merged top breed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgreementAssessment {
    pub tier: AgreementTier,
    /// Percentage of models whose own top-1 equals the merged top breed
    pub agreement_percentage: f64,
}

impl AgreementAssessment {
    /// Assessment used when no breed gathered cross-model support
    pub fn no_consensus() -> Self {
        Self {
            tier: AgreementTier::Low,
            agreement_percentage: 0.0,
        }
    }
}

/// Result of comparing an upstream merged ranking with the local one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamCheck {
    pub upstream_top: Option<String>,
    pub local_top: String,
    pub agrees: bool,
}

/// Complete engine output for one ensemble response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleReport {
    /// Unique report identifier
    pub report_id: String,

    /// Upstream request identifier, when the producer supplied one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// Report generation timestamp
    pub generated_at: DateTime<Utc>,

    /// Models that contributed predictions
    pub models_used: Vec<String>,

    /// Locally computed merged ranking
    pub merged: MergedRanking,

    /// Breeds backed by more than one model
    pub consensus: Vec<ConsensusBreed>,

    pub agreement: AgreementAssessment,

    /// Cross-check against the upstream merged ranking, if one was supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_check: Option<UpstreamCheck>,
}

impl EnsembleReport {
    /// Create a new report
    pub fn new(
        models_used: Vec<String>,
        merged: MergedRanking,
        consensus: Vec<ConsensusBreed>,
        agreement: AgreementAssessment,
    ) -> Self {
        Self {
            report_id: uuid::Uuid::new_v4().to_string(),
            request_id: None,
            generated_at: Utc::now(),
            models_used,
            merged,
            consensus,
            agreement,
            upstream_check: None,
        }
    }

    /// Attach the upstream request identifier
    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    /// Attach the upstream cross-check outcome
    pub fn with_upstream_check(mut self, check: Option<UpstreamCheck>) -> Self {
        self.upstream_check = check;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::prediction::Prediction;

    #[test]
    fn test_tier_from_percentage() {
        let thresholds = AgreementThresholds::default();

        assert_eq!(AgreementTier::from_percentage(100.0, &thresholds), AgreementTier::High);
        assert_eq!(AgreementTier::from_percentage(66.0, &thresholds), AgreementTier::High);
        assert_eq!(AgreementTier::from_percentage(65.9, &thresholds), AgreementTier::Moderate);
        assert_eq!(AgreementTier::from_percentage(33.0, &thresholds), AgreementTier::Moderate);
        assert_eq!(AgreementTier::from_percentage(32.9, &thresholds), AgreementTier::Low);
        assert_eq!(AgreementTier::from_percentage(0.0, &thresholds), AgreementTier::Low);
    }

    #[test]
    fn test_tier_ordering() {
        assert!(AgreementTier::Low < AgreementTier::Moderate);
        assert!(AgreementTier::Moderate < AgreementTier::High);
    }

    #[test]
    fn test_tier_wire_names() {
        assert_eq!(serde_json::to_string(&AgreementTier::Moderate).unwrap(), "\"MODERATE\"");
        let tier: AgreementTier = serde_json::from_str("\"LOW\"").unwrap();
        assert_eq!(tier, AgreementTier::Low);
        assert_eq!(AgreementTier::High.as_str(), "HIGH");
    }

    #[test]
    fn test_thresholds_partial_deserialize() {
        let thresholds: AgreementThresholds = serde_json::from_str(r#"{"high": 70.0}"#).unwrap();
        assert_eq!(thresholds.high, 70.0);
        assert_eq!(thresholds.moderate, 33.0);
    }

    #[test]
    fn test_support_fraction() {
        let breed = ConsensusBreed {
            breed: "Poodle".to_string(),
            support_count: 2,
        };
        assert!((breed.support_fraction(4) - 0.5).abs() < 1e-9);
        assert_eq!(breed.support_fraction(0), 0.0);
    }

    #[test]
    fn test_report_serialization() {
        let merged = MergedRanking::new(vec![Prediction::new("Poodle", 0.6).with_support(2)]);
        let report = EnsembleReport::new(
            vec!["resnet".to_string(), "vit".to_string()],
            merged,
            vec![ConsensusBreed {
                breed: "Poodle".to_string(),
                support_count: 2,
            }],
            AgreementAssessment {
                tier: AgreementTier::High,
                agreement_percentage: 100.0,
            },
        )
        .with_request_id(Some("req_42".to_string()));

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"tier\":\"HIGH\""));
        assert!(!json.contains("upstream_check"));

        let deserialized: EnsembleReport = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.report_id, report.report_id);
        assert_eq!(deserialized.request_id.as_deref(), Some("req_42"));
        assert_eq!(deserialized.agreement, report.agreement);
        assert_eq!(deserialized.merged, report.merged);
    }
}
