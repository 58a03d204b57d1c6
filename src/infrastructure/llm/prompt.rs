use crate::domain::{Message, SearchResult};
use crate::infrastructure::config::PromptsConfig;

/// Renders the system preamble with retrieved chunks numbered in rank order.
pub fn answer_preamble(prompts: &PromptsConfig, context: &[SearchResult]) -> String {
    let context = if context.is_empty() {
        prompts.no_context.clone()
    } else {
        context
            .iter()
            .enumerate()
            .map(|(i, r)| format!("[{}] {}", i + 1, r.chunk.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    format!("{}\n\n----------------\n{}", prompts.system, context)
}

pub fn answer_prompt(question: &str, history: &[Message]) -> String {
    if history.is_empty() {
        return question.to_string();
    }

    format!(
        "Previous conversation:\n{}\n\nCurrent message from user: {}",
        render_history(history),
        question
    )
}

pub fn condense_prompt(prompts: &PromptsConfig, question: &str, history: &[Message]) -> String {
    format!(
        "{}\n\nChat History:\n{}\nFollow Up Input: {}\nStandalone question:",
        prompts.condense,
        render_history(history),
        question
    )
}

fn render_history(history: &[Message]) -> String {
    history
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str(), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}
