use serde::Serialize;

use super::error::AnalysisError;
use super::metrics::Metric;
use super::recommend::Recommendation;
use super::risk::RiskAssessment;
use super::verify::Verification;

/// Final pipeline output, persisted as pretty-printed JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub query: String,
    pub verification: Verification,
    pub metrics: Vec<Metric>,
    pub risks: RiskAssessment,
    pub recommendations: Recommendation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl AnalysisReport {
    pub fn to_text(&self) -> Result<String, AnalysisError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Compact digest handed to the model for the narrative summary.
    pub fn digest(&self) -> String {
        let metrics = self
            .metrics
            .iter()
            .map(|m| format!("{} = {}", m.name, m.value))
            .collect::<Vec<_>>()
            .join(", ");
        let factors = self
            .risks
            .factors
            .iter()
            .map(|f| f.indicator.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "Metrics: {}\nRisk level: {:?} ({})\nRecommendation: {:?}",
            if metrics.is_empty() { "none found" } else { metrics.as_str() },
            self.risks.level,
            if factors.is_empty() { "no indicators" } else { factors.as_str() },
            self.recommendations.action,
        )
    }
}
