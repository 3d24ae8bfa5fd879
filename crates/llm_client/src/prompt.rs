// Prompt template for "Ask AI about selection".
//
// Three labeled sections: the selection, the question, and a fixed
// instruction pinning the model to the supplied context.

/// Compose the prompt sent to the inference endpoint.
pub fn build_prompt(selected_text: &str, question: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str("[Selected Text]\n");
    prompt.push_str(selected_text);
    prompt.push_str("\n\n");

    prompt.push_str("[User Question]\n");
    prompt.push_str(question);
    prompt.push_str("\n\n");

    prompt.push_str("Provide the best possible answer based strictly on the content above.");

    prompt
}
