// Quill - terminal text editor with Ask AI for the current selection

mod ask;
mod exit_codes;
mod preflight;
mod tui;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_ERROR, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Terminal text editor with Ask AI for the current selection")]
#[command(version)]
struct Cli {
    /// File to open in the editor
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the model about a piece of text, without the editor
    #[command(after_help = "\
Examples:
  git diff | quill ask 'summarize this change'
  quill ask 'what does this config do?' --file nginx.conf
  quill ask 'translate to English' --file notes.txt --model mistral:7b")]
    Ask {
        /// Question for the model
        question: String,

        /// Read the selection from a file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,

        /// Override the Ollama endpoint from settings
        #[arg(long)]
        endpoint: Option<String>,

        /// Override the model from settings
        #[arg(long)]
        model: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Ask {
            question,
            file,
            endpoint,
            model,
        }) => ask::cmd_ask(question, file, endpoint, model),
        None => tui::run(cli.file),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_USAGE,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_IO,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_ERROR,
            message: msg.into(),
            hint: None,
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
