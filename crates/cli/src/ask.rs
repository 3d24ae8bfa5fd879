//! `quill ask`: headless one-shot query.
//!
//! The selection comes from `--file` or piped stdin; the answer goes to
//! stdout. A gateway failure prints its text to stderr and exits with
//! the AI exit code so scripts can tell "model said nothing useful"
//! from "could not reach the model".

use std::io::Read;
use std::path::PathBuf;

use quill_config::Settings;
use quill_llm_client::{LlmClient, QueryResult};

use crate::exit_codes::EXIT_AI;
use crate::preflight::prepare_query;
use crate::CliError;

pub fn cmd_ask(
    question: String,
    file: Option<PathBuf>,
    endpoint: Option<String>,
    model: Option<String>,
) -> Result<(), CliError> {
    let settings = Settings::load();
    let endpoint = endpoint.unwrap_or_else(|| settings.ai.effective_endpoint().to_string());
    let model = model.unwrap_or_else(|| settings.ai.effective_model().to_string());

    let selection = read_selection(file)?;
    let answer = ask_once(&endpoint, &model, &selection, &question)?;
    println!("{}", answer);
    Ok(())
}

/// Read the selection text from a file or from piped stdin.
fn read_selection(file: Option<PathBuf>) -> Result<String, CliError> {
    match file {
        Some(path) => std::fs::read_to_string(&path)
            .map_err(|e| CliError::io(format!("failed to read {}: {}", path.display(), e))),
        None => {
            if atty::is(atty::Stream::Stdin) {
                return Err(CliError::args("no selection to ask about")
                    .with_hint("pipe text on stdin or pass --file PATH"));
            }
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| CliError::io(format!("failed to read stdin: {}", e)))?;
            Ok(text)
        }
    }
}

/// Run one query against the given endpoint. Split from `cmd_ask` so
/// tests can point it at a mock server without touching settings.
fn ask_once(
    endpoint: &str,
    model: &str,
    selection: &str,
    question: &str,
) -> Result<String, CliError> {
    let query = prepare_query(Some(selection), question)
        .map_err(|e| CliError::args(e.to_string()))?;

    let client = LlmClient::new(endpoint, model);
    match client.ask(&query.selected_text, &query.question) {
        QueryResult::Answer(text) => Ok(text),
        QueryResult::Failure(msg) => Err(CliError {
            code: EXIT_AI,
            message: msg,
            hint: Some("is the Ollama server running?".to_string()),
        }),
    }
}
