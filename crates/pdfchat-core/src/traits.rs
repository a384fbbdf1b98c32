//! Collaborator traits for pdfchat.
//!
//! - [`DocumentExtractor`]: Turn document bytes into pages
//! - [`Chunker`]: Split pages into passages
//! - [`Embedder`]: Generate vector embeddings
//! - [`LanguageModel`]: Generate answer text from messages
//!
//! Each stage sits behind a trait so providers can be swapped (or faked in
//! tests) without touching the pipeline.

use async_trait::async_trait;

use crate::error::{ConfigError, EmbedError, ExtractError, GenerateError};
use crate::types::{Chunk, ChunkConfig, ChatMessage, EmbeddingConfig, EmbeddingOutput, PageBlock};

// ============================================================================
// Extraction
// ============================================================================

/// Trait for extracting page text from a document.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Extract one [`PageBlock`] per page, in document order.
    async fn extract(&self, data: &[u8]) -> Result<Vec<PageBlock>, ExtractError>;
}

// ============================================================================
// Chunking
// ============================================================================

/// Trait for splitting pages into chunks.
pub trait Chunker: Send + Sync {
    /// Name of this chunking strategy.
    fn name(&self) -> &str;

    /// Split pages into chunks. Deterministic for identical input.
    fn split(&self, blocks: &[PageBlock], config: &ChunkConfig) -> Result<Vec<Chunk>, ConfigError>;
}

// ============================================================================
// Embedding
// ============================================================================

/// Trait for generating embeddings.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model name/identifier.
    fn model_name(&self) -> &str;

    /// Embedding dimension.
    fn dimension(&self) -> usize;

    /// Embed a batch of texts, one output per input in the same order.
    async fn embed_text(
        &self,
        texts: &[&str],
        config: &EmbeddingConfig,
    ) -> Result<Vec<EmbeddingOutput>, EmbedError>;

    /// Embed a query.
    async fn embed_query(
        &self,
        query: &str,
        config: &EmbeddingConfig,
    ) -> Result<EmbeddingOutput, EmbedError> {
        let results = self.embed_text(&[query], config).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| EmbedError::InvalidResponse("empty embedding result".to_string()))
    }
}

// ============================================================================
// Generation
// ============================================================================

/// Trait for language-model collaborators.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model name/identifier.
    fn model_name(&self) -> &str;

    /// Produce the assistant reply for a message list.
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, GenerateError>;
}
