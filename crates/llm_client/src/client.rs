// Ollama HTTP client for the Ask AI feature.
//
// One synchronous POST per query, fixed timeout, no retries, no
// streaming. Every failure path collapses into a displayable Failure
// string; nothing propagates past `ask`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::prompt::build_prompt;

/// Fixed deadline for the generate call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Answer shown when the backend replies without a `response` field.
const NO_RESPONSE: &str = "(no response)";

/// Outcome of one query. Exactly one of the two, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    /// Model-generated answer text
    Answer(String),
    /// Displayable failure message ("Error contacting LLM:\n...")
    Failure(String),
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

/// Ollama API client (blocking).
#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::blocking::Client,
    base_url: String,
    model: String,
}

impl LlmClient {
    /// Create a client for the given endpoint and model.
    pub fn new(endpoint: &str, model: &str) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("quill/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            base_url: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask the model about a selection.
    ///
    /// Blocks for up to the fixed timeout; run on a worker thread from
    /// interactive contexts. Infallible at the type level: any network,
    /// status, or parse fault becomes a `Failure`.
    pub fn ask(&self, selected_text: &str, question: &str) -> QueryResult {
        let prompt = build_prompt(selected_text, question);
        match self.generate(&prompt) {
            Ok(answer) => QueryResult::Answer(answer),
            Err(cause) => QueryResult::Failure(format!("Error contacting LLM:\n{}", cause)),
        }
    }

    /// One non-streamed generate round trip. Returns the answer text or
    /// a human-readable cause.
    fn generate(&self, prompt: &str) -> Result<String, String> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(format!("HTTP {}: {}", status.as_u16(), text));
        }

        let parsed: GenerateResponse = response.json().map_err(|e| e.to_string())?;
        Ok(parsed.response.unwrap_or_else(|| NO_RESPONSE.to_string()))
    }
}
