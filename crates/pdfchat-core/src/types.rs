//! Core types for pdfchat.
//!
//! ## Document
//! - [`PageBlock`]: Text of one physical page
//! - [`Chunk`]: A bounded passage of page text
//! - [`ChunkConfig`]: Window size and overlap for chunking
//!
//! ## Embeddings
//! - [`EmbeddingConfig`]: Batching for embedding calls
//! - [`EmbeddingOutput`]: Result of embedding a text
//!
//! ## Retrieval and conversation
//! - [`ScoredChunk`]: A chunk returned by similarity search
//! - [`Role`], [`ConversationTurn`], [`ConversationMemory`]: Conversation history
//! - [`ChatMessage`]: A message sent to the language model
//! - [`Answer`]: A grounded answer with its source passages

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ============================================================================
// Document
// ============================================================================

/// Text extracted from one physical page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBlock {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Page text, empty for blank pages
    pub text: String,
}

impl PageBlock {
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A bounded slice of page text prepared for embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Page the text was taken from (1-indexed)
    pub source_page: u32,
    /// The passage
    pub text: String,
    /// Position in the document-wide chunk sequence (0-indexed)
    pub sequence_index: u32,
}

/// Configuration for chunking.
///
/// Sizes are measured in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Window length
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks of the same page
    pub overlap: usize,
}

impl ChunkConfig {
    pub const DEFAULT_CHUNK_SIZE: usize = 1000;
    pub const DEFAULT_OVERLAP: usize = 200;

    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, ConfigError> {
        let config = Self {
            chunk_size,
            overlap,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the window advances on every step.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.overlap >= self.chunk_size {
            return Err(ConfigError::OverlapTooLarge {
                chunk_size: self.chunk_size,
                overlap: self.overlap,
            });
        }
        Ok(())
    }

    /// Distance between the starts of consecutive windows.
    pub fn step(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
            overlap: Self::DEFAULT_OVERLAP,
        }
    }
}

// ============================================================================
// Embedding
// ============================================================================

/// Configuration for embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Texts sent per provider call
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self { batch_size: 32 }
    }
}

/// Output from embedding.
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    /// The embedding vector
    pub embedding: Vec<f32>,
    /// Number of tokens in input (approximate for local providers)
    pub token_count: usize,
}

// ============================================================================
// Retrieval
// ============================================================================

/// A search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    /// Cosine similarity to the query
    pub score: f32,
}

// ============================================================================
// Conversation
// ============================================================================

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One entry of the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Ordered conversation history for one session.
///
/// Turns are only appended; [`ConversationMemory::truncate`] exists to roll
/// back a turn whose exchange did not complete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationMemory {
    turns: Vec<ConversationTurn>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Drop every turn after the first `len`.
    pub fn truncate(&mut self, len: usize) {
        self.turns.truncate(len);
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

/// A message sent to the language model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

impl From<&ConversationTurn> for ChatMessage {
    fn from(turn: &ConversationTurn) -> Self {
        Self {
            role: turn.role,
            content: turn.text.clone(),
        }
    }
}

/// A grounded answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    /// Passages retrieved for the question, best first
    pub source_chunks: Vec<ScoredChunk>,
}

impl Answer {
    /// Distinct source pages in retrieval order.
    pub fn source_pages(&self) -> Vec<u32> {
        let mut pages = Vec::new();
        for hit in &self.source_chunks {
            if !pages.contains(&hit.chunk.source_page) {
                pages.push(hit.chunk.source_page);
            }
        }
        pages
    }
}
