//! # pdfchat-core
//!
//! Core types and traits for pdfchat, a retrieval-augmented question answering
//! pipeline over a single PDF document.
//!
//! This crate provides the foundational abstractions used throughout pdfchat:
//!
//! - **Text Extraction**: [`DocumentExtractor`] trait for turning PDF bytes into pages
//! - **Chunking**: [`Chunker`] trait for splitting pages into overlapping passages
//! - **Embedding Generation**: [`Embedder`] trait for converting text to vectors
//! - **Generation**: [`LanguageModel`] trait for producing grounded answers
//!
//! ## Architecture
//!
//! ```text
//! PDF bytes → DocumentExtractor → PageBlock → Chunker → Chunk → Embedder → IndexHandle
//!                                                                              ↓
//!            question + ConversationMemory → search → ScoredChunk → LanguageModel → Answer
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PageBlock`] | Text of one physical page |
//! | [`Chunk`] | A bounded passage traceable to its source page |
//! | [`ScoredChunk`] | A chunk returned by similarity search |
//! | [`ConversationMemory`] | Ordered user/assistant turns for one session |
//! | [`Answer`] | Generated answer plus the passages it was grounded on |
//!
//! ## Related Crates
//!
//! - `pdfchat-extract`: PDF text extraction
//! - `pdfchat-chunker`: Fixed-size chunking
//! - `pdfchat-embed`: Embedding providers
//! - `pdfchat-store`: In-memory vector index
//! - `pdfchat-llm`: Language-model providers
//! - `pdfchat-session`: Session state and the retrieval-augmented answerer

pub mod error;
pub mod traits;
pub mod types;

pub use error::{ConfigError, EmbedError, Error, ExtractError, GenerateError, Result};
pub use traits::*;
pub use types::*;
