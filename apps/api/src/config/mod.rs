use serde::Deserialize;

use crate::error::Result;
use crate::services::completion::{DEFAULT_COMPLETION_BASE_URL, DEFAULT_COMPLETION_MODEL};
use crate::services::open_library::{DEFAULT_PAGE_SIZE, DEFAULT_SEARCH_URL};

const ENV_PREFIX: &str = "APP";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Open Library search endpoint
    pub open_library_url: String,
    pub results_per_page: usize,
    pub completion_base_url: String,
    pub completion_model: String,
    /// Recommendations are disabled when no key is configured
    #[serde(default)]
    pub completion_api_key: Option<String>,
}

impl Config {
    /// Loads `.env` (if present) and then the `APP_*` environment variables.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_env_prefix(ENV_PREFIX)
    }

    pub fn from_env_prefix(prefix: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8080_i64)?
            .set_default("open_library_url", DEFAULT_SEARCH_URL)?
            .set_default("results_per_page", DEFAULT_PAGE_SIZE as i64)?
            .set_default("completion_base_url", DEFAULT_COMPLETION_BASE_URL)?
            .set_default("completion_model", DEFAULT_COMPLETION_MODEL)?
            .add_source(config::Environment::with_prefix(prefix).try_parsing(true))
            .build()?;

        let mut config: Config = settings.try_deserialize()?;
        config.completion_api_key = config
            .completion_api_key
            .filter(|key| !key.trim().is_empty());
        config.results_per_page = config.results_per_page.max(1);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_env_prefix("NAVIGATOR_DEFAULTS_TEST").unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.open_library_url, "https://openlibrary.org/search.json");
        assert_eq!(config.results_per_page, 12);
        assert_eq!(config.completion_model, DEFAULT_COMPLETION_MODEL);
        assert!(config.completion_api_key.is_none());
    }

    #[test]
    fn test_environment_overrides() {
        std::env::set_var("NAVIGATOR_OVERRIDE_TEST_PORT", "9090");
        std::env::set_var("NAVIGATOR_OVERRIDE_TEST_RESULTS_PER_PAGE", "24");
        std::env::set_var("NAVIGATOR_OVERRIDE_TEST_COMPLETION_API_KEY", "sk-test");

        let config = Config::from_env_prefix("NAVIGATOR_OVERRIDE_TEST").unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.results_per_page, 24);
        assert_eq!(config.completion_api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        std::env::set_var("NAVIGATOR_BLANK_KEY_TEST_COMPLETION_API_KEY", " ");

        let config = Config::from_env_prefix("NAVIGATOR_BLANK_KEY_TEST").unwrap();

        assert!(config.completion_api_key.is_none());
    }
}
