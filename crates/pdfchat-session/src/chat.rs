//! Chat facade with user-facing status messages.
//!
//! [`PdfChat`] never returns an error: every outcome is a report carrying a
//! message suitable for display.

use pdfchat_core::{ConversationTurn, Error, ScoredChunk};
use serde::Serialize;
use tracing::info;

use crate::answerer::Answerer;
use crate::session::{Ingestor, Session};

/// Questions offered to the user right after a document is ingested.
pub const SUGGESTED_QUESTIONS: &[&str] = &[
    "What is this document about?",
    "Summarize the main points",
    "Give me the key information",
    "What are the important details?",
    "Explain the content in simple terms",
];

/// Outcome of [`PdfChat::ingest`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestReport {
    pub success: bool,
    pub message: String,
    /// Pages in the document, 0 on failure
    pub page_count: usize,
}

/// Outcome of [`PdfChat::ask`].
#[derive(Debug, Clone, Serialize)]
pub struct AskReply {
    /// Answer text, or a status message when no answer was produced
    pub answer: String,
    /// Passages the answer was grounded on, empty on failure
    pub sources: Vec<ScoredChunk>,
    /// Whether `answer` came from the model
    pub answered: bool,
}

impl AskReply {
    fn status(message: impl Into<String>) -> Self {
        Self {
            answer: message.into(),
            sources: vec![],
            answered: false,
        }
    }

    /// Distinct source pages in retrieval order.
    pub fn source_pages(&self) -> Vec<u32> {
        let mut pages = Vec::new();
        for hit in &self.sources {
            if !pages.contains(&hit.chunk.source_page) {
                pages.push(hit.chunk.source_page);
            }
        }
        pages
    }
}

/// One user's chat over one document at a time.
pub struct PdfChat {
    ingestor: Ingestor,
    answerer: Answerer,
    session: Session,
}

impl PdfChat {
    pub fn new(ingestor: Ingestor, answerer: Answerer) -> Self {
        Self {
            ingestor,
            answerer,
            session: Session::new(),
        }
    }

    /// Replace the current document with `bytes`.
    pub async fn ingest(&mut self, bytes: &[u8]) -> IngestReport {
        match self.ingestor.ingest_into(&mut self.session, bytes).await {
            Ok(summary) => IngestReport {
                success: true,
                message: format!(
                    "Successfully processed {} pages from PDF!",
                    summary.page_count
                ),
                page_count: summary.page_count,
            },
            Err(e) => IngestReport {
                success: false,
                message: format!("Error processing PDF: {e}"),
                page_count: 0,
            },
        }
    }

    pub async fn ask(&mut self, question: &str) -> AskReply {
        let question = question.trim();
        if question.is_empty() {
            return AskReply::status("Please enter a question.");
        }

        match self.answerer.ask(&mut self.session, question).await {
            Ok(answer) => AskReply {
                answer: answer.text,
                sources: answer.source_chunks,
                answered: true,
            },
            Err(Error::NotReady) => AskReply::status("Please upload a PDF first!"),
            Err(e) => AskReply::status(format!("Error getting response: {e}")),
        }
    }

    /// Forget the document and the conversation.
    pub fn reset(&mut self) {
        self.session.reset();
        info!("Chat session {} cleared", self.session.id());
    }

    pub fn history(&self) -> &[ConversationTurn] {
        self.session.history()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}
