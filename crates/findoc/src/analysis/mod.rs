//! Financial document analysis.
//!
//! The worker sees only the [`Analyzer`] trait. [`AnalysisPipeline`] is the
//! production implementation, built from named stages that each take the
//! previous stage's typed output.

pub mod error;
pub mod extract;
pub mod llm;
pub mod metrics;
pub mod recommend;
pub mod report;
pub mod risk;
pub mod roles;
pub mod runner;
pub mod search;
pub mod verify;

use std::path::Path;

pub use error::{AnalysisError, Stage};
pub use extract::{DocumentExtractor, TextExtractor};
pub use llm::{LlmClient, OpenAiClient};
pub use report::AnalysisReport;
pub use roles::{RoleProfile, Roles};
pub use runner::AnalysisPipeline;
pub use search::{NoSearch, SearchProvider, SerperSearch};

/// Produces a report for `file_path` answering `query`.
///
/// Must return an error, never an empty report, for documents it cannot read.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, query: &str, file_path: &Path) -> Result<String, AnalysisError>;
}
