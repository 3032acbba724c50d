use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::rag::index::DistanceMetric;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub embedding_model: String,
    pub chat_model: String,
    pub rapidapi_key: String,
    pub rapidapi_host: String,
    pub index_dir: PathBuf,
    pub index_collection: String,
    pub index_metric: DistanceMetric,
    /// Retrieval breadth. Wider than the shortlist so the model can re-rank.
    pub retrieval_k: usize,
    pub shortlist_size: usize,
    pub max_context_chars: usize,
    pub request_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            embedding_model: env_or("EMBEDDING_MODEL", "text-embedding-3-small"),
            chat_model: env_or("CHAT_MODEL", "gpt-4o-mini"),
            rapidapi_key: require_env("RAPIDAPI_KEY")?,
            rapidapi_host: env_or("RAPIDAPI_HOST", "jsearch.p.rapidapi.com"),
            index_dir: PathBuf::from(env_or("INDEX_DIR", "job_index")),
            index_collection: env_or("INDEX_COLLECTION", "jobs"),
            index_metric: parse_env("INDEX_METRIC", DistanceMetric::Cosine)?,
            retrieval_k: parse_env("RETRIEVAL_K", 10)?,
            shortlist_size: parse_env("SHORTLIST_SIZE", 5)?,
            max_context_chars: parse_env("MAX_CONTEXT_CHARS", 24_000)?,
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 15)?,
            port: parse_env("PORT", 5000)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} has an invalid value '{raw}': {e}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration for tests: fake credentials, an isolated index directory.
    pub fn for_tests(index_dir: impl Into<PathBuf>) -> Self {
        Config {
            openai_api_key: "test-openai-key".to_string(),
            openai_base_url: "http://127.0.0.1:9".to_string(),
            embedding_model: "test-embedding".to_string(),
            chat_model: "test-chat".to_string(),
            rapidapi_key: "test-rapidapi-key".to_string(),
            rapidapi_host: "127.0.0.1:9".to_string(),
            index_dir: index_dir.into(),
            index_collection: "jobs".to_string(),
            index_metric: DistanceMetric::Cosine,
            retrieval_k: 10,
            shortlist_size: 5,
            max_context_chars: 24_000,
            request_timeout_secs: 15,
            port: 5000,
            rust_log: "debug".to_string(),
        }
    }
}
