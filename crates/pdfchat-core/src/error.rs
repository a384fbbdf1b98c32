//! Error types for pdfchat.

use std::time::Duration;
use thiserror::Error;

/// Main error type for pipeline operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The document could not be read or holds no usable pages
    #[error("unreadable document: {0}")]
    Unreadable(#[from] ExtractError),

    /// Invalid chunking or retrieval parameters
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The embedding collaborator failed
    #[error("embedding failed: {0}")]
    EmbeddingFailed(#[from] EmbedError),

    /// The language-model collaborator failed
    #[error("generation failed: {0}")]
    GenerationFailed(#[from] GenerateError),

    /// A question was asked before any document was ingested
    #[error("no document has been ingested")]
    NotReady,
}

/// Text extraction errors.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("document has no pages")]
    NoPages,

    #[error("document has no extractable text")]
    NoText,

    #[error("extraction failed: {0}")]
    Failed(String),
}

/// Configuration errors, reported before any processing begins.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("chunk_size must be greater than zero")]
    ZeroChunkSize,

    #[error("overlap ({overlap}) must be less than chunk_size ({chunk_size})")]
    OverlapTooLarge { chunk_size: usize, overlap: usize },

    #[error("top_k must be greater than zero")]
    ZeroTopK,

    #[error("batch_size must be greater than zero")]
    ZeroBatchSize,
}

/// Embedding errors.
#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("api error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Language-model errors.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("api error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
