//! # pdfchat-embed
//!
//! Embedding providers for pdfchat.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`OpenAiEmbedder`] | Remote embeddings from any OpenAI-compatible `/v1/embeddings` endpoint |
//! | [`HashEmbedder`] | Local feature-hashing embedder, deterministic and offline |
//!
//! Both implement [`Embedder`](pdfchat_core::Embedder). Credentials are passed
//! in by the caller; nothing here reads the environment.
//!
//! ```rust,ignore
//! use pdfchat_embed::OpenAiEmbedder;
//! use std::time::Duration;
//!
//! let embedder = OpenAiEmbedder::new(api_key, "text-embedding-ada-002", 1536)
//!     .with_timeout(Duration::from_secs(60));
//! ```

pub mod hash;
pub mod openai;

pub use hash::HashEmbedder;
pub use openai::OpenAiEmbedder;
