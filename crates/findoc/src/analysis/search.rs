//! External knowledge lookup used for market context.

use std::time::Duration;

use serde_json::json;
use tracing::debug;

use crate::config::SearchConfig;

use super::error::AnalysisError;

const MAX_SNIPPETS: usize = 5;

pub trait SearchProvider: Send + Sync {
    /// Returns a plain-text digest of results; empty when nothing was found.
    fn search(&self, query: &str) -> Result<String, AnalysisError>;
}

/// Used when no search API key is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSearch;

impl SearchProvider for NoSearch {
    fn search(&self, _query: &str) -> Result<String, AnalysisError> {
        Ok(String::new())
    }
}

/// Serper (google.serper.dev) web search.
pub struct SerperSearch {
    client: reqwest::blocking::Client,
    api_key: String,
    endpoint: String,
}

impl SerperSearch {
    pub fn new(api_key: String, endpoint: String) -> Result<Self, AnalysisError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| AnalysisError::Search(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            endpoint,
        })
    }

    /// `None` when no API key is configured.
    pub fn from_config(config: &SearchConfig) -> Result<Option<Self>, AnalysisError> {
        match &config.api_key {
            Some(key) => Self::new(key.clone(), config.endpoint.clone()).map(Some),
            None => Ok(None),
        }
    }
}

impl SearchProvider for SerperSearch {
    fn search(&self, query: &str) -> Result<String, AnalysisError> {
        debug!(endpoint = %self.endpoint, "Search request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&json!({ "q": query }))
            .send()
            .map_err(|e| AnalysisError::Search(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::Search(format!("HTTP {}", status.as_u16())));
        }

        let body: serde_json::Value = response
            .json()
            .map_err(|e| AnalysisError::Search(e.to_string()))?;
        Ok(digest_organic_results(&body))
    }
}

fn digest_organic_results(body: &serde_json::Value) -> String {
    body.get("organic")
        .and_then(|v| v.as_array())
        .map(|results| {
            results
                .iter()
                .take(MAX_SNIPPETS)
                .filter_map(|r| {
                    let title = r.get("title").and_then(|t| t.as_str())?;
                    let snippet = r.get("snippet").and_then(|s| s.as_str()).unwrap_or("");
                    Some(format!("- {}: {}", title, snippet))
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}
