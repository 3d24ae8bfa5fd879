// Ask AI preconditions.
//
// The gateway does not re-validate its inputs; the caller must refuse
// to build a query without a selection or with an empty question. Kept
// pure so "no selection means no HTTP call" is testable without a
// server.

use std::fmt;

/// A validated query, ready for the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub selected_text: String,
    pub question: String,
}

/// Why a query was refused before reaching the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreflightError {
    /// No text currently selected
    NoSelection,
    /// Question is empty (or whitespace only)
    EmptyQuestion,
}

impl fmt::Display for PreflightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreflightError::NoSelection => write!(f, "Select some text first"),
            PreflightError::EmptyQuestion => write!(f, "Type a question first"),
        }
    }
}

/// Validate the (selection, question) pair into a `Query`.
pub fn prepare_query(
    selection: Option<&str>,
    question: &str,
) -> Result<Query, PreflightError> {
    let selected_text = selection
        .filter(|s| !s.is_empty())
        .ok_or(PreflightError::NoSelection)?
        .to_string();

    let question = question.trim();
    if question.is_empty() {
        return Err(PreflightError::EmptyQuestion);
    }

    Ok(Query {
        selected_text,
        question: question.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_selection_never_builds_a_query() {
        assert_eq!(
            prepare_query(None, "why?"),
            Err(PreflightError::NoSelection)
        );
        assert_eq!(
            prepare_query(Some(""), "why?"),
            Err(PreflightError::NoSelection)
        );
    }

    #[test]
    fn empty_question_is_refused() {
        assert_eq!(
            prepare_query(Some("text"), ""),
            Err(PreflightError::EmptyQuestion)
        );
        assert_eq!(
            prepare_query(Some("text"), "   \n"),
            Err(PreflightError::EmptyQuestion)
        );
    }

    #[test]
    fn valid_pair_builds_query_with_trimmed_question() {
        let q = prepare_query(Some("fn main() {}"), "  what is this? ").unwrap();
        assert_eq!(q.selected_text, "fn main() {}");
        assert_eq!(q.question, "what is this?");
    }
}
