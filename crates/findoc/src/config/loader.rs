use std::path::{Path, PathBuf};

use crate::config::schema::Config;
use crate::error::ConfigError;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Loads `.env` (if present) and applies environment overrides on top of
/// `config`, then re-validates.
pub fn apply_env(mut config: Config) -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();

    if let Some(key) = env_opt("OPENAI_API_KEY") {
        config.llm.api_key = Some(key);
    }
    if let Some(url) = env_opt("OPENAI_BASE_URL") {
        config.llm.base_url = url;
    }
    if let Some(model) = env_opt("FINDOC_MODEL") {
        config.llm.model = model;
    }
    if let Some(key) = env_opt("SERPER_API_KEY") {
        config.search.api_key = Some(key);
    }
    if let Some(bind) = env_opt("FINDOC_BIND") {
        config.bind_address = bind;
    }
    if let Some(dir) = env_opt("FINDOC_DATA_DIR") {
        config.data_directory = PathBuf::from(dir);
    }
    if let Some(workers) = env_opt("FINDOC_WORKERS") {
        config.worker_count = workers.parse().map_err(|_| ConfigError::InvalidEnv {
            name: "FINDOC_WORKERS".to_string(),
            value: workers.clone(),
        })?;
    }
    if let Some(format) = env_opt("FINDOC_LOG_FORMAT") {
        config.log_format = format.parse().map_err(|_| ConfigError::InvalidEnv {
            name: "FINDOC_LOG_FORMAT".to_string(),
            value: format.clone(),
        })?;
    }

    validate_config(&config)?;
    Ok(config)
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.worker_count == 0 {
        return Err(ConfigError::Validation {
            message: "worker_count must be greater than zero".to_string(),
        });
    }

    if config.queue_capacity == 0 {
        return Err(ConfigError::Validation {
            message: "queue_capacity must be greater than zero".to_string(),
        });
    }

    if config.result_retention_secs == 0 {
        return Err(ConfigError::Validation {
            message: "result_retention_secs must be greater than zero".to_string(),
        });
    }

    if config.default_query.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "default_query must not be empty".to_string(),
        });
    }

    if let Some(0) = config.submissions_per_minute {
        return Err(ConfigError::Validation {
            message: "submissions_per_minute must be greater than zero when set".to_string(),
        });
    }

    if !(0.0..=2.0).contains(&config.llm.temperature) {
        return Err(ConfigError::Validation {
            message: format!(
                "llm.temperature must be between 0 and 2, got {}",
                config.llm.temperature
            ),
        });
    }

    Ok(())
}
