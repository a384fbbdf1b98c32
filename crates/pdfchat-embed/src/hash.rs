//! Local feature-hashing embedder.
//!
//! Each lowercase alphanumeric token is hashed with blake3 into one of
//! `dimension` buckets with a hashed sign, and the resulting bag-of-words
//! vector is L2-normalized. Texts sharing vocabulary score higher under
//! cosine similarity; identical texts score 1.0.
//!
//! No network and no model download, which makes it the embedder for
//! `--offline` runs and for tests.

use async_trait::async_trait;
use pdfchat_core::{EmbedError, Embedder, EmbeddingConfig, EmbeddingOutput};

/// Deterministic offline embedder.
///
/// # Example
///
/// ```rust
/// use pdfchat_core::{Embedder, EmbeddingConfig};
/// use pdfchat_embed::HashEmbedder;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let embedder = HashEmbedder::new();
/// let outputs = embedder
///     .embed_text(&["Hello world"], &EmbeddingConfig::default())
///     .await?;
/// assert_eq!(outputs[0].embedding.len(), 256);
/// # Ok(())
/// # }
/// ```
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// Create a hash embedder with default dimension (256).
    #[must_use]
    pub fn new() -> Self {
        Self { dimension: 256 }
    }

    /// Create a hash embedder with custom dimension.
    #[must_use]
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn embed_one(&self, text: &str) -> EmbeddingOutput {
        let mut embedding = vec![0.0f32; self.dimension];
        let mut token_count = 0;

        for token in tokens(text) {
            let hash = blake3::hash(token.as_bytes());
            let bytes = hash.as_bytes();
            let mut bucket_bytes = [0u8; 8];
            bucket_bytes.copy_from_slice(&bytes[..8]);
            let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimension as u64) as usize;
            let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };
            embedding[bucket] += sign;
            token_count += 1;
        }

        let norm = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }

        EmbeddingOutput {
            embedding,
            token_count,
        }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase alphanumeric runs.
fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn model_name(&self) -> &str {
        "feature-hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_text(
        &self,
        texts: &[&str],
        _config: &EmbeddingConfig,
    ) -> Result<Vec<EmbeddingOutput>, EmbedError> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}
