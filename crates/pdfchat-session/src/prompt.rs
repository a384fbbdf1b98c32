//! Grounded prompt construction.

use pdfchat_core::{ChatMessage, ConversationTurn, ScoredChunk};

/// Instructions placed ahead of the retrieved context.
pub const SYSTEM_INSTRUCTIONS: &str = "You are a helpful assistant answering questions about a PDF document. \
Answer using only the context passages below. \
If the context does not contain the answer, say that you don't know. \
Mention the page numbers you relied on.";

/// Render retrieved passages, each labelled with its page.
pub fn format_context(hits: &[ScoredChunk]) -> String {
    hits.iter()
        .map(|hit| format!("[Page {}]\n{}", hit.chunk.source_page, hit.chunk.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Messages for one question: system context, prior turns, then the question.
pub fn build_messages(
    question: &str,
    hits: &[ScoredChunk],
    history: &[ConversationTurn],
) -> Vec<ChatMessage> {
    let mut system = String::from(SYSTEM_INSTRUCTIONS);
    system.push_str("\n\nContext:\n");
    if hits.is_empty() {
        system.push_str("(no passages found)");
    } else {
        system.push_str(&format_context(hits));
    }

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system));
    messages.extend(history.iter().map(ChatMessage::from));
    messages.push(ChatMessage::user(question));
    messages
}
