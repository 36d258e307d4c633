use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::document::chunker::{ChunkerConfig, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::llm_client::{CompletionParams, DEFAULT_ANTHROPIC_BASE_URL, DEFAULT_MODEL};
use crate::retrieval::retriever::{
    DEFAULT_MAX_CONTEXT_SECTIONS, DEFAULT_QUERIES, DEFAULT_RESULTS_PER_QUERY,
};

pub const DEFAULT_EMBEDDING_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
/// Characters of resume text embedded verbatim in the user prompt.
pub const DEFAULT_RESUME_PROMPT_CHARS: usize = 3000;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub aws_region: String,
    /// Custom endpoint for MinIO / localstack. Enables path-style addressing.
    pub s3_endpoint: Option<String>,
    /// (access key id, secret). `None` falls back to the default provider chain.
    pub static_credentials: Option<(String, String)>,
    pub anthropic_api_key: String,
    pub anthropic_base_url: String,
    pub chat_model: String,
    pub embedding_api_key: String,
    pub embedding_base_url: String,
    pub embedding_model: String,
    pub http_timeout: Duration,
    pub pipeline: PipelineSettings,
}

/// Knobs for a single pipeline run. Defaults reproduce the production behavior.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub scratch_dir: PathBuf,
    pub chunker: ChunkerConfig,
    pub queries: Vec<String>,
    pub results_per_query: usize,
    pub max_context_sections: usize,
    pub resume_prompt_chars: usize,
    pub completion: CompletionParams,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            scratch_dir: std::env::temp_dir(),
            chunker: ChunkerConfig::default(),
            queries: DEFAULT_QUERIES.iter().map(|q| q.to_string()).collect(),
            results_per_query: DEFAULT_RESULTS_PER_QUERY,
            max_context_sections: DEFAULT_MAX_CONTEXT_SECTIONS,
            resume_prompt_chars: DEFAULT_RESUME_PROMPT_CHARS,
            completion: CompletionParams::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let static_credentials = match (
            optional_env("AWS_ACCESS_KEY_ID"),
            optional_env("AWS_SECRET_ACCESS_KEY"),
        ) {
            (Some(id), Some(secret)) => Some((id, secret)),
            _ => None,
        };

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            aws_region: optional_env("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            s3_endpoint: optional_env("S3_ENDPOINT"),
            static_credentials,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            anthropic_base_url: optional_env("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_BASE_URL.to_string()),
            chat_model: optional_env("CHAT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            embedding_api_key: require_env("EMBEDDING_API_KEY")?,
            embedding_base_url: optional_env("EMBEDDING_BASE_URL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_BASE_URL.to_string()),
            embedding_model: optional_env("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            http_timeout: Duration::from_secs(parse_env("HTTP_TIMEOUT_SECS", 120)?),
            pipeline: PipelineSettings::from_env()?,
        })
    }
}

impl PipelineSettings {
    pub fn from_env() -> Result<Self> {
        let defaults = PipelineSettings::default();
        let chunker = ChunkerConfig::new(
            parse_env("CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?,
            parse_env("CHUNK_OVERLAP", DEFAULT_CHUNK_OVERLAP)?,
        )
        .context("invalid CHUNK_SIZE / CHUNK_OVERLAP")?;

        let results_per_query = parse_env("RETRIEVAL_K", defaults.results_per_query)?;
        anyhow::ensure!(results_per_query > 0, "RETRIEVAL_K must be positive");

        Ok(PipelineSettings {
            scratch_dir: optional_env("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.scratch_dir),
            chunker,
            queries: defaults.queries,
            results_per_query,
            max_context_sections: parse_env("MAX_CONTEXT_SECTIONS", defaults.max_context_sections)?,
            resume_prompt_chars: parse_env("RESUME_PROMPT_CHARS", defaults.resume_prompt_chars)?,
            completion: CompletionParams {
                max_tokens: parse_env("MAX_OUTPUT_TOKENS", defaults.completion.max_tokens)?,
                temperature: parse_env("TEMPERATURE", defaults.completion.temperature)?,
                top_p: parse_env("TOP_P", defaults.completion.top_p)?,
            },
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}
