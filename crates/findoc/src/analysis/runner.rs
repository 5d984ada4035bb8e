use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info_span, warn};

use crate::config::Config;
use crate::sanitize;

use super::error::{AnalysisError, Stage};
use super::extract::{DocumentExtractor, TextExtractor};
use super::llm::{LlmClient, OpenAiClient};
use super::metrics::{self, Metric};
use super::recommend::{self, Recommendation};
use super::report::AnalysisReport;
use super::risk::{self, RiskAssessment};
use super::roles::Roles;
use super::search::{NoSearch, SearchProvider, SerperSearch};
use super::verify::{self, Verification};
use super::Analyzer;

/// Document text is truncated to this many characters in model prompts.
const MAX_PROMPT_CHARS: usize = 12_000;

/// Words of the document heading carried into the market lookup.
const HEADING_WORDS: usize = 8;

struct VerifiedDocument {
    text: String,
    verification: Verification,
}

/// verify → extract_metrics → assess_risk → recommend → summarize.
///
/// Stateless between runs; one instance is shared by every worker.
pub struct AnalysisPipeline {
    extractor: Box<dyn TextExtractor>,
    search: Box<dyn SearchProvider>,
    llm: Option<Box<dyn LlmClient>>,
    roles: Arc<Roles>,
}

impl AnalysisPipeline {
    pub fn new(
        extractor: Box<dyn TextExtractor>,
        search: Box<dyn SearchProvider>,
        llm: Option<Box<dyn LlmClient>>,
        roles: Arc<Roles>,
    ) -> Self {
        Self {
            extractor,
            search,
            llm,
            roles,
        }
    }

    /// Production constructor. Search and summary are enabled only when their
    /// API keys are configured.
    pub fn from_config(config: &Config, roles: Arc<Roles>) -> Result<Self, AnalysisError> {
        let search: Box<dyn SearchProvider> = match SerperSearch::from_config(&config.search)? {
            Some(s) => Box::new(s),
            None => Box::new(NoSearch),
        };
        let llm = OpenAiClient::from_config(&config.llm)?.map(|c| {
            tracing::info!(model = c.model(), "Narrative summary enabled");
            Box::new(c) as Box<dyn LlmClient>
        });

        Ok(Self::new(Box::new(DocumentExtractor::new()), search, llm, roles))
    }

    /// Runs every stage and returns the typed report.
    pub fn run(&self, query: &str, file_path: &Path) -> Result<AnalysisReport, AnalysisError> {
        let filename = sanitize::redact_path(file_path);
        let _pipeline_span = info_span!("analysis", file = %filename).entered();
        let mut warnings = Vec::new();

        let document = {
            let _step = info_span!("stage", stage = %Stage::Verify, role = %self.roles.verifier.role)
                .entered();
            self.step_verify(file_path)
                .map_err(|e| e.in_stage(Stage::Verify))?
        };
        warnings.extend(document.verification.warnings.iter().cloned());

        let metrics = {
            let _step =
                info_span!("stage", stage = %Stage::ExtractMetrics, role = %self.roles.analyst.role)
                    .entered();
            self.step_extract_metrics(&document)
        };

        let risks = {
            let _step = info_span!(
                "stage",
                stage = %Stage::AssessRisk,
                role = %self.roles.risk_assessor.role
            )
            .entered();
            self.step_assess_risk(&document, &metrics)
        };

        let recommendations = {
            let _step =
                info_span!("stage", stage = %Stage::Recommend, role = %self.roles.advisor.role)
                    .entered();
            self.step_recommend(&document, &metrics, &risks, &mut warnings)
        };

        let mut report = AnalysisReport {
            query: query.to_string(),
            verification: document.verification.clone(),
            metrics,
            risks,
            recommendations,
            summary: None,
            warnings,
        };

        if let Some(llm) = &self.llm {
            let _step =
                info_span!("stage", stage = %Stage::Summarize, role = %self.roles.analyst.role)
                    .entered();
            report.summary = Some(
                self.step_summarize(llm.as_ref(), &document, &report)
                    .map_err(|e| e.in_stage(Stage::Summarize))?,
            );
        }

        Ok(report)
    }

    fn step_verify(&self, file_path: &Path) -> Result<VerifiedDocument, AnalysisError> {
        let text = self.extractor.extract(file_path)?;
        let verification = verify::verify(&text);
        debug!(
            characters = verification.characters,
            sections = verification.sections_found.len(),
            "Document verified"
        );
        Ok(VerifiedDocument { text, verification })
    }

    fn step_extract_metrics(&self, document: &VerifiedDocument) -> Vec<Metric> {
        let metrics = metrics::extract_metrics(&document.text);
        debug!(count = metrics.len(), "Metrics extracted");
        metrics
    }

    fn step_assess_risk(&self, document: &VerifiedDocument, metrics: &[Metric]) -> RiskAssessment {
        let assessment = risk::assess_risk(&document.text, metrics);
        debug!(level = ?assessment.level, factors = assessment.factors.len(), "Risk assessed");
        assessment
    }

    fn step_recommend(
        &self,
        document: &VerifiedDocument,
        metrics: &[Metric],
        risks: &RiskAssessment,
        warnings: &mut Vec<String>,
    ) -> Recommendation {
        // Market context is optional; a failed lookup only degrades the report.
        let lookup = market_lookup(&document.text, metrics);
        debug!(lookup = %lookup, "Looking up market context");
        let market_context = match self.search.search(&lookup) {
            Ok(digest) => Some(digest),
            Err(e) => {
                warn!(error = %e, "Market context lookup failed");
                warnings.push(format!("Market context unavailable: {}", e));
                None
            }
        };
        recommend::recommend(metrics, risks, market_context)
    }

    fn step_summarize(
        &self,
        llm: &dyn LlmClient,
        document: &VerifiedDocument,
        report: &AnalysisReport,
    ) -> Result<String, AnalysisError> {
        let excerpt: String = document.text.chars().take(MAX_PROMPT_CHARS).collect();
        let prompt = format!(
            "Query: {}\n\nFindings so far:\n{}\n\nDocument excerpt:\n{}\n\n\
             Write a concise summary answering the query, grounded only in the document.",
            report.query,
            report.digest(),
            excerpt
        );
        llm.complete(&self.roles.analyst.system_prompt(), &prompt)
    }
}

/// Search terms for the market lookup, built from what the document itself
/// says: its opening heading plus the labels of the metrics found in it. The
/// user's query never leaves the process through this path.
pub(crate) fn market_lookup(text: &str, metrics: &[Metric]) -> String {
    let heading = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.split('.').next())
        .map(|sentence| {
            sentence
                .split_whitespace()
                .take(HEADING_WORDS)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();

    let mut terms: Vec<String> = Vec::new();
    if !heading.is_empty() {
        terms.push(heading);
    }
    for metric in metrics {
        if !terms.iter().any(|t| t.eq_ignore_ascii_case(&metric.label)) {
            terms.push(metric.label.clone());
        }
    }
    terms.push("market outlook".to_string());
    terms.join(" ")
}

impl Analyzer for AnalysisPipeline {
    fn analyze(&self, query: &str, file_path: &Path) -> Result<String, AnalysisError> {
        self.run(query, file_path)?.to_text()
    }
}
