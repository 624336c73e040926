//! Search-query refinement for titles the catalog could not match directly.
//!
//! [`QueryRefiner`] is the seam the resolver depends on; [`LlmQueryRefiner`]
//! is the production implementation backed by an OpenAI-compatible chat
//! completions endpoint. Tests substitute their own implementations.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::types::MovieResult;

/// Longest refined query accepted from the model.
const MAX_QUERY_CHARS: usize = 200;

/// How many initial results are shown to the model.
const MAX_CONTEXT_RESULTS: usize = 5;

const SYSTEM_PROMPT: &str = "You are an expert movie database search query refiner. \
You receive a film title, its release year when known, and the results a first TMDB search returned. \
Work out why the search failed to find the right film: a wrong year, an alternative or original-language title, \
extra punctuation, or missing keywords. Reply with a JSON object of the form {\"refinedQuery\": \"...\"} \
holding a single search query more likely to return the correct film. Do not add any explanation.";

/// Input to a refinement call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinementRequest<'a> {
    pub title: &'a str,
    pub year: Option<u16>,
    /// Results from the initial search; usually empty.
    pub initial_results: &'a [MovieResult],
}

#[derive(Debug, Error)]
pub enum RefinementError {
    /// No refiner is configured.
    #[error("refinement unavailable")]
    Unavailable,

    #[error("refinement request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("refinement service returned status {status}")]
    UnexpectedStatus { status: u16 },

    /// The model answered, but not with a usable single-line query.
    #[error("malformed refinement output: {0}")]
    MalformedOutput(String),

    #[error("invalid refiner base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

/// Produces an alternative search query for a title that found no match.
#[async_trait]
pub trait QueryRefiner: Send + Sync {
    /// Returns a single-line, non-empty query.
    ///
    /// # Errors
    ///
    /// Any [`RefinementError`]; callers treat every failure as "no match".
    async fn refine(&self, request: &RefinementRequest<'_>) -> Result<String, RefinementError>;
}

/// [`QueryRefiner`] backed by an OpenAI-compatible chat completions API.
#[derive(Clone)]
pub struct LlmQueryRefiner {
    client: Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for LlmQueryRefiner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmQueryRefiner")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"[redacted]")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl LlmQueryRefiner {
    /// Creates a refiner posting to `{base_url}/chat/completions`.
    ///
    /// # Errors
    ///
    /// Returns [`RefinementError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`RefinementError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, RefinementError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join("chat/completions"))
            .map_err(|e| RefinementError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl QueryRefiner for LlmQueryRefiner {
    async fn refine(&self, request: &RefinementRequest<'_>) -> Result<String, RefinementError> {
        let req_body = json!({
            "model": self.model,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": user_prompt(request) }
            ],
            "temperature": 0.1
        });

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&req_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RefinementError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body: Value = response.json().await?;
        let content = body
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|msg| msg.get("content"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                RefinementError::MalformedOutput("response has no message content".to_owned())
            })?;

        let refined = parse_refined_query(content)?;
        tracing::debug!(title = request.title, refined, "query refined");
        Ok(refined)
    }
}

fn user_prompt(request: &RefinementRequest<'_>) -> String {
    let year = request
        .year
        .map_or_else(|| "an unknown year".to_owned(), |y| y.to_string());
    let shown = &request.initial_results[..request.initial_results.len().min(MAX_CONTEXT_RESULTS)];
    let results = serde_json::to_string(shown).unwrap_or_else(|_| "[]".to_owned());
    format!(
        "Movie title: \"{}\"\nReleased in: {year}\nInitial TMDB search results: {results}",
        request.title
    )
}

/// Extracts and validates `refinedQuery` from the model's JSON reply.
fn parse_refined_query(content: &str) -> Result<String, RefinementError> {
    let parsed: Value = serde_json::from_str(content.trim())
        .map_err(|e| RefinementError::MalformedOutput(format!("not a JSON object: {e}")))?;

    let raw = parsed
        .get("refinedQuery")
        .and_then(Value::as_str)
        .ok_or_else(|| RefinementError::MalformedOutput("missing \"refinedQuery\"".to_owned()))?;

    let query = raw.trim().trim_matches('"').trim();
    if query.is_empty() {
        return Err(RefinementError::MalformedOutput("empty query".to_owned()));
    }
    if query.contains(['\n', '\r']) {
        return Err(RefinementError::MalformedOutput(
            "query spans multiple lines".to_owned(),
        ));
    }
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(RefinementError::MalformedOutput(format!(
            "query longer than {MAX_QUERY_CHARS} characters"
        )));
    }

    Ok(query.to_owned())
}
