//! Hosted-model summarization: source content in, validated tree out.
//!
//! One request per call. Failures are reported once and never retried; the
//! caller decides whether to try again.

use crate::config::SummarizerConfig;
use crate::ingest::SourceContent;
use crate::ir::{DEFAULT_MAX_DEPTH, MindMap, TreeError};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;
use std::env;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

mod prompt;

use prompt::{GenerateContentResponse, build_request};

static CODE_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*\s*(.*?)\s*```\s*$").unwrap());

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("API key is missing; set GEMINI_API_KEY or API_KEY")]
    MissingApiKey,
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model API returned HTTP {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },
    #[error("model returned no content")]
    EmptyResponse,
    #[error("model output is not a valid mind map: {0}")]
    InvalidTree(#[source] TreeError),
}

impl SummarizeError {
    /// Single message suitable for showing to the person who asked for the map.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingApiKey => "API Key is missing.",
            Self::Transport(_) | Self::HttpStatus { .. } => {
                "The summarization service could not be reached. Please try again."
            }
            Self::EmptyResponse => "No response from the model.",
            Self::InvalidTree(_) => "Failed to generate a valid mind map structure.",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: SummarizerConfig,
    api_key: String,
    max_depth: usize,
}

impl GeminiClient {
    pub fn new(config: SummarizerConfig) -> Result<Self, SummarizeError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(SummarizeError::MissingApiKey)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms.max(1)))
            .build()?;
        Ok(Self {
            http,
            config,
            api_key,
            max_depth: DEFAULT_MAX_DEPTH,
        })
    }

    /// Fill the key (and optional model/base URL overrides) from the
    /// environment, reading `.env` first when present.
    pub fn from_env(mut config: SummarizerConfig) -> Result<Self, SummarizeError> {
        let _ = dotenvy::dotenv();
        if config.api_key.is_none() {
            config.api_key = read_optional_env("GEMINI_API_KEY").or_else(|| read_optional_env("API_KEY"));
        }
        if let Some(model) = read_optional_env("GEMINI_MODEL") {
            config.model = model;
        }
        if let Some(base_url) = read_optional_env("GEMINI_BASE_URL") {
            config.base_url = base_url;
        }
        Self::new(config)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub async fn generate_tree(&self, source: &SourceContent) -> Result<MindMap, SummarizeError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        let request = build_request(source);
        info!(
            model = %self.config.model,
            source = %source.name,
            kind = source.kind.as_str(),
            "requesting mind map from model"
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "model request rejected");
            return Err(SummarizeError::HttpStatus { status, body });
        }

        let payload: GenerateContentResponse = response.json().await?;
        let text = payload.text().ok_or(SummarizeError::EmptyResponse)?;
        debug!(chars = text.len(), "received model output");
        parse_tree_response(&text, self.max_depth)
    }
}

/// Parse raw model output into a validated tree. Tolerates a surrounding
/// Markdown code fence.
pub fn parse_tree_response(text: &str, max_depth: usize) -> Result<MindMap, SummarizeError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(SummarizeError::EmptyResponse);
    }
    let body = CODE_FENCE_RE
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(trimmed);
    MindMap::from_json(body, max_depth).map_err(|err| {
        warn!(error = %err, "model output failed validation");
        SummarizeError::InvalidTree(err)
    })
}

fn read_optional_env(name: &str) -> Option<String> {
    env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_owned())
        }
    })
}
