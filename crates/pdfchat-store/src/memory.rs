//! In-memory index with brute-force cosine search.

use chrono::{DateTime, Utc};
use pdfchat_core::{
    Chunk, ConfigError, EmbedError, Embedder, EmbeddingConfig, EmbeddingOutput, Result,
    ScoredChunk,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Number of chunks retrieved per question unless configured otherwise.
pub const DEFAULT_TOP_K: usize = 3;

/// Settings for building and querying an index.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Batching for embedding calls
    pub embedding: EmbeddingConfig,
    /// Upper bound on each embedding call
    pub request_timeout: Duration,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            embedding: EmbeddingConfig::default(),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Summary of a built index.
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub id: Uuid,
    pub chunk_count: usize,
    /// Distinct source pages with at least one chunk
    pub page_count: usize,
    pub dimension: usize,
    pub model: String,
    pub built_at: DateTime<Utc>,
}

struct IndexEntry {
    chunk: Chunk,
    embedding: Vec<f32>,
}

/// Chunks of one document with their embeddings.
///
/// Entries keep insertion order, which is the tie-break order for search.
pub struct IndexHandle {
    id: Uuid,
    built_at: DateTime<Utc>,
    embedder: Arc<dyn Embedder>,
    config: IndexConfig,
    dimension: usize,
    entries: Vec<IndexEntry>,
}

impl IndexHandle {
    /// Embed every chunk and build the index.
    ///
    /// All-or-nothing: the first failed batch aborts the build and nothing is
    /// kept.
    pub async fn build(
        chunks: Vec<Chunk>,
        embedder: Arc<dyn Embedder>,
        config: &IndexConfig,
    ) -> Result<Self> {
        if config.embedding.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize.into());
        }

        let dimension = embedder.dimension();
        let mut embeddings: Vec<Vec<f32>> = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(config.embedding.batch_size) {
            let texts: Vec<&str> = batch.iter().map(|c| c.text.as_str()).collect();
            let outputs = embed_with_timeout(embedder.as_ref(), &texts, config).await?;

            if outputs.len() != texts.len() {
                return Err(EmbedError::InvalidResponse(format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    outputs.len()
                ))
                .into());
            }

            for output in outputs {
                if output.embedding.len() != dimension {
                    return Err(EmbedError::DimensionMismatch {
                        expected: dimension,
                        actual: output.embedding.len(),
                    }
                    .into());
                }
                embeddings.push(output.embedding);
            }
        }

        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry { chunk, embedding })
            .collect::<Vec<_>>();

        debug!(
            "Built index with {} chunks ({} dims, model {})",
            entries.len(),
            dimension,
            embedder.model_name()
        );

        Ok(Self {
            id: Uuid::new_v4(),
            built_at: Utc::now(),
            embedder,
            config: config.clone(),
            dimension,
            entries,
        })
    }

    /// Return up to `k` chunks most similar to `query`, best first.
    ///
    /// Equal scores keep insertion order. An index with fewer than `k`
    /// chunks returns all of them.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        if k == 0 || self.entries.is_empty() {
            return Ok(vec![]);
        }

        let timeout = self.config.request_timeout;
        let query_embedding = tokio::time::timeout(
            timeout,
            self.embedder.embed_query(query, &self.config.embedding),
        )
        .await
        .map_err(|_| EmbedError::Timeout(timeout))??
        .embedding;

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(&query_embedding, &entry.embedding)))
            .collect();

        // Stable sort preserves insertion order for ties
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let hits: Vec<ScoredChunk> = scored
            .into_iter()
            .take(k)
            .map(|(i, score)| ScoredChunk {
                chunk: self.entries[i].chunk.clone(),
                score,
            })
            .collect();

        debug!("Search returned {} of {} chunks", hits.len(), self.entries.len());
        Ok(hits)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored chunks in insertion order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.entries.iter().map(|entry| &entry.chunk)
    }

    pub fn stats(&self) -> IndexStats {
        let mut pages: Vec<u32> = self.chunks().map(|c| c.source_page).collect();
        pages.dedup();

        IndexStats {
            id: self.id,
            chunk_count: self.entries.len(),
            page_count: pages.len(),
            dimension: self.dimension,
            model: self.embedder.model_name().to_string(),
            built_at: self.built_at,
        }
    }
}

impl std::fmt::Debug for IndexHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexHandle")
            .field("id", &self.id)
            .field("chunks", &self.entries.len())
            .field("dimension", &self.dimension)
            .field("model", &self.embedder.model_name())
            .finish()
    }
}

async fn embed_with_timeout(
    embedder: &dyn Embedder,
    texts: &[&str],
    config: &IndexConfig,
) -> std::result::Result<Vec<EmbeddingOutput>, EmbedError> {
    tokio::time::timeout(
        config.request_timeout,
        embedder.embed_text(texts, &config.embedding),
    )
    .await
    .map_err(|_| EmbedError::Timeout(config.request_timeout))?
}

/// Compute cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
