use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::retry::RetryPolicy;

/// Application configuration loaded from environment variables.
/// Startup aborts if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub adzuna_app_id: String,
    pub adzuna_api_key: String,
    pub adzuna_country: String,
    pub adzuna_results_per_page: u32,
    pub profile_dir: PathBuf,
    pub search_config_path: PathBuf,
    pub location_penalty: f64,
    pub salary_decay: f64,
    pub scoring_concurrency: usize,
    pub max_retries: u32,
    pub http_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            adzuna_app_id: require_env("ADZUNA_APP_ID")?,
            adzuna_api_key: require_env("ADZUNA_API_KEY")?,
            adzuna_country: optional_env("ADZUNA_COUNTRY", "gb".to_string())?.to_lowercase(),
            adzuna_results_per_page: optional_env("ADZUNA_RESULTS_PER_PAGE", 20)?,
            profile_dir: optional_env("PROFILE_DIR", PathBuf::from("profile"))?,
            search_config_path: optional_env(
                "SEARCH_CONFIG_PATH",
                PathBuf::from("config/search_config.yaml"),
            )?,
            location_penalty: optional_env("LOCATION_PENALTY", 0.5)?,
            salary_decay: optional_env("SALARY_DECAY", 1.0)?,
            scoring_concurrency: optional_env("SCORING_CONCURRENCY", 4_usize)?.max(1),
            max_retries: optional_env("MAX_RETRIES", 3)?,
            http_timeout: Duration::from_secs(optional_env("HTTP_TIMEOUT_SECS", 30)?),
            port: optional_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_secs(1))
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
