//! Chat-completion client for the narrative summary.

use std::time::Duration;

use serde_json::json;
use tracing::debug;

use crate::config::LlmConfig;

use super::error::AnalysisError;

pub trait LlmClient: Send + Sync {
    fn complete(&self, system: &str, prompt: &str) -> Result<String, AnalysisError>;
}

/// OpenAI-compatible `/v1/chat/completions` over a blocking client.
///
/// Must be constructed and dropped outside an async runtime.
pub struct OpenAiClient {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
}

impl OpenAiClient {
    /// `None` when no API key is configured.
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>, AnalysisError> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Some(Self {
            client,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            temperature: config.temperature,
        }))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl LlmClient for OpenAiClient {
    fn complete(&self, system: &str, prompt: &str) -> Result<String, AnalysisError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": prompt },
            ],
            "temperature": self.temperature,
        });

        debug!("Chat completion request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            return Err(AnalysisError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AnalysisError::Llm(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let resp: serde_json::Value = response.json()?;
        parse_completion(&resp)
    }
}

fn parse_completion(resp: &serde_json::Value) -> Result<String, AnalysisError> {
    resp["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| AnalysisError::Llm("missing choices[0].message.content".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_completion() {
        let resp = json!({
            "choices": [{ "message": { "role": "assistant", "content": "  Solid quarter.  " } }]
        });
        assert_eq!(parse_completion(&resp).unwrap(), "Solid quarter.");
    }

    #[test]
    fn test_parse_completion_missing_content() {
        let err = parse_completion(&json!({ "choices": [] })).unwrap_err();
        assert!(matches!(err, AnalysisError::Llm(_)));
    }

    #[test]
    fn test_from_config_without_key() {
        assert!(OpenAiClient::from_config(&LlmConfig::default())
            .unwrap()
            .is_none());
    }
}
