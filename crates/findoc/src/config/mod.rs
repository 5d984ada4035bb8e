pub mod loader;
pub mod schema;

pub use loader::{apply_env, load_config, load_config_from_str};
pub use schema::{Config, LlmConfig, LogFormat, SearchConfig, DEFAULT_QUERY};
