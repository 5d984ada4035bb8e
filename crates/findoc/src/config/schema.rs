use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Query used when an upload arrives without one (or with only whitespace).
pub const DEFAULT_QUERY: &str = "Extract key financial metrics (revenue, profit, cash flow), \
identify risks, and provide concise investment recommendations. \
Return results in structured JSON with fields: metrics, risks, recommendations.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_data_directory")]
    pub data_directory: PathBuf,
    /// Where uploads live between `POST /analyze` and job completion.
    /// Defaults to `<data_directory>/staging`.
    #[serde(default)]
    pub staging_directory: Option<PathBuf>,
    /// Defaults to `<data_directory>/analysis.db`.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// How long the queue remembers a job's state after its last update.
    #[serde(default = "default_result_retention_secs")]
    pub result_retention_secs: u64,
    /// Admission limit on `POST /analyze`; `None` disables it.
    #[serde(default)]
    pub submissions_per_minute: Option<u32>,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    #[serde(default = "default_query")]
    pub default_query: String,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_data_directory() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("findoc"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

fn default_bind_address() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_worker_count() -> usize {
    num_cpus::get()
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_result_retention_secs() -> u64 {
    24 * 60 * 60
}

fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024
}

fn default_query() -> String {
    DEFAULT_QUERY.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_directory: default_data_directory(),
            staging_directory: None,
            database_path: None,
            bind_address: default_bind_address(),
            worker_count: default_worker_count(),
            queue_capacity: default_queue_capacity(),
            result_retention_secs: default_result_retention_secs(),
            submissions_per_minute: None,
            max_upload_bytes: default_max_upload_bytes(),
            default_query: default_query(),
            llm: LlmConfig::default(),
            search: SearchConfig::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    pub fn staging_directory(&self) -> PathBuf {
        self.staging_directory
            .clone()
            .unwrap_or_else(|| self.data_directory.join("staging"))
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| self.data_directory.join("analysis.db"))
    }
}

/// OpenAI-compatible chat completion settings. Without an API key the
/// analysis pipeline runs without a narrative summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_llm_base_url(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,
}

fn default_search_endpoint() -> String {
    "https://google.serper.dev/search".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_search_endpoint(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}
