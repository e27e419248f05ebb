use anyhow::{Context, Result};
use dotenvy::dotenv;
use leadgen::AccumulatorConfig;
use std::env;
use std::str::FromStr;

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub database_url: String,
    pub batch_delay_ms: Option<u64>,
    pub max_batches: Option<usize>,
    pub early_stop_after: Option<usize>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            gemini_api_key: env::var("GEMINI_API_KEY").ok(),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-3-flash-preview".to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://leadgen.db?mode=rwc".to_string()),
            batch_delay_ms: parse_var("LEADGEN_BATCH_DELAY_MS")?,
            max_batches: parse_var("LEADGEN_MAX_BATCHES")?,
            early_stop_after: parse_var("LEADGEN_EARLY_STOP_AFTER")?,
        })
    }

    /// The Gemini key, required for extraction runs.
    pub fn api_key(&self) -> Result<&str> {
        self.gemini_api_key
            .as_deref()
            .context("GEMINI_API_KEY must be set")
    }

    /// Apply environment overrides on top of a preset.
    pub fn accumulator_config(&self, mut base: AccumulatorConfig) -> AccumulatorConfig {
        if let Some(ms) = self.batch_delay_ms {
            base.batch_delay_ms = ms;
        }
        if let Some(max) = self.max_batches {
            base.max_batches = Some(max);
        }
        if let Some(after) = self.early_stop_after {
            base.early_stop_after = after;
        }
        base
    }
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} must be a valid number")),
        Err(_) => Ok(None),
    }
}
