//! Ollama query client.
//!
//! Blocking reqwest client (no Tokio runtime required).
//! One round trip per query: build prompt → POST /api/generate → answer.

mod client;
mod prompt;

pub use client::{LlmClient, QueryResult, DEFAULT_TIMEOUT_SECS};
pub use prompt::build_prompt;
