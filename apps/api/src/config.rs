use anyhow::{ensure, Context, Result};

use crate::llm_client::{LlmConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Built once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            llm: LlmConfig {
                api_key: optional_env("OPENROUTER_API_KEY"),
                base_url: optional_env("OPENROUTER_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                model: optional_env("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                timeout_secs: parse_timeout_secs(optional_env("LLM_TIMEOUT_SECS"))?,
            },
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Empty values count as unset so `KEY=` in a .env file behaves like a missing key.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A zero timeout would fail every call immediately, so it is rejected.
fn parse_timeout_secs(value: Option<String>) -> Result<Option<u64>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let secs = value
        .parse::<u64>()
        .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?;
    ensure!(secs > 0, "LLM_TIMEOUT_SECS must be greater than zero");
    Ok(Some(secs))
}
