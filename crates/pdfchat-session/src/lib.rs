//! Session state and retrieval-augmented answering for pdfchat.
//!
//! A [`Session`] owns at most one indexed document and the conversation
//! about it. The [`Ingestor`] fills it (extract, chunk, embed) and the
//! [`Answerer`] queries it. [`PdfChat`] bundles the three behind the
//! status-message API used by front ends.

pub mod answerer;
pub mod chat;
pub mod prompt;
pub mod session;

#[cfg(test)]
mod testing;

pub use answerer::{AnswerConfig, Answerer};
pub use chat::{AskReply, IngestReport, PdfChat, SUGGESTED_QUESTIONS};
pub use session::{IngestSummary, Ingestor, PreparedDocument, Session};
