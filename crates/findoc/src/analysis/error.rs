use std::fmt;

use thiserror::Error;

/// Named steps of the analysis pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Verify,
    ExtractMetrics,
    AssessRisk,
    Recommend,
    Summarize,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Verify => "verify",
            Stage::ExtractMetrics => "extract_metrics",
            Stage::AssessRisk => "assess_risk",
            Stage::Recommend => "recommend",
            Stage::Summarize => "summarize",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Unreadable document '{file}': {reason}")]
    UnreadableDocument { file: String, reason: String },

    #[error("Rate limited by model provider{}", retry_hint(.retry_after_secs))]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Model provider error: {0}")]
    Llm(String),

    #[error("Search provider error: {0}")]
    Search(String),

    #[error("Failed to serialize report: {0}")]
    Report(#[from] serde_json::Error),

    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<AnalysisError>,
    },
}

fn retry_hint(secs: &Option<u64>) -> String {
    match secs {
        Some(s) => format!(" (retry after {}s)", s),
        None => String::new(),
    }
}

impl AnalysisError {
    /// Attributes this error to `stage`. Errors already attributed keep
    /// their original stage.
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            AnalysisError::Stage { .. } => self,
            other => AnalysisError::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            AnalysisError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The underlying error with any stage attribution removed.
    pub fn root(&self) -> &AnalysisError {
        match self {
            AnalysisError::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self.root(), AnalysisError::RateLimited { .. })
    }

    pub fn is_unreadable_document(&self) -> bool {
        matches!(self.root(), AnalysisError::UnreadableDocument { .. })
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(e: reqwest::Error) -> Self {
        AnalysisError::Llm(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_attribution_in_message() {
        let err = AnalysisError::UnreadableDocument {
            file: "x.pdf".into(),
            reason: "no extractable text".into(),
        }
        .in_stage(Stage::Verify);

        assert_eq!(err.stage(), Some(Stage::Verify));
        assert!(err.is_unreadable_document());
        assert_eq!(
            err.to_string(),
            "verify stage failed: Unreadable document 'x.pdf': no extractable text"
        );
    }

    #[test]
    fn test_first_stage_wins() {
        let err = AnalysisError::Llm("boom".into())
            .in_stage(Stage::Summarize)
            .in_stage(Stage::Recommend);
        assert_eq!(err.stage(), Some(Stage::Summarize));
    }

    #[test]
    fn test_rate_limit_detected_through_stage() {
        let err = AnalysisError::RateLimited {
            retry_after_secs: Some(20),
        }
        .in_stage(Stage::Summarize);
        assert!(err.is_rate_limited());
        assert!(err.to_string().contains("retry after 20s"));
    }
}
