//! Session state and document ingestion.

use pdfchat_chunker::FixedSizeChunker;
use pdfchat_core::{
    Chunk, ChunkConfig, Chunker, ConversationMemory, ConversationTurn, DocumentExtractor,
    Embedder, Error, ExtractError, PageBlock, Result,
};
use pdfchat_extract::PdfExtractor;
use pdfchat_store::{IndexConfig, IndexHandle};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// State of one interactive user.
///
/// Without an index the session can only be reset or ingested into.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    pub(crate) index: Option<IndexHandle>,
    pub(crate) memory: ConversationMemory,
    page_count: usize,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            index: None,
            memory: ConversationMemory::new(),
            page_count: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Whether a document has been ingested.
    pub fn is_ready(&self) -> bool {
        self.index.is_some()
    }

    pub fn index(&self) -> Option<&IndexHandle> {
        self.index.as_ref()
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn history(&self) -> &[ConversationTurn] {
        self.memory.turns()
    }

    /// Pages in the ingested document, blank ones included.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn chunk_count(&self) -> usize {
        self.index.as_ref().map_or(0, IndexHandle::len)
    }

    /// Discard the document and the conversation.
    pub fn reset(&mut self) {
        self.index = None;
        self.memory.clear();
        self.page_count = 0;
        debug!("Session {} reset", self.id);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Pages and chunks of a document, before embedding.
#[derive(Debug, Clone)]
pub struct PreparedDocument {
    pub pages: Vec<PageBlock>,
    pub chunks: Vec<Chunk>,
}

/// Result of a successful ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub page_count: usize,
    pub chunk_count: usize,
}

/// Runs extraction, chunking and indexing for a session.
pub struct Ingestor {
    extractor: Arc<dyn DocumentExtractor>,
    chunker: Arc<dyn Chunker>,
    embedder: Arc<dyn Embedder>,
    chunk_config: ChunkConfig,
    index_config: IndexConfig,
}

impl Ingestor {
    /// Build an ingestor, rejecting an invalid chunk configuration up front.
    pub fn new(
        extractor: Arc<dyn DocumentExtractor>,
        chunker: Arc<dyn Chunker>,
        embedder: Arc<dyn Embedder>,
        chunk_config: ChunkConfig,
        index_config: IndexConfig,
    ) -> Result<Self> {
        chunk_config.validate()?;
        Ok(Self {
            extractor,
            chunker,
            embedder,
            chunk_config,
            index_config,
        })
    }

    /// Ingestor for PDF files with the fixed-size chunker.
    pub fn pdf(
        embedder: Arc<dyn Embedder>,
        chunk_config: ChunkConfig,
        index_config: IndexConfig,
    ) -> Result<Self> {
        Self::new(
            Arc::new(PdfExtractor::new()),
            Arc::new(FixedSizeChunker::new()),
            embedder,
            chunk_config,
            index_config,
        )
    }

    pub fn chunk_config(&self) -> &ChunkConfig {
        &self.chunk_config
    }

    /// Extract and chunk without embedding.
    ///
    /// A document without any page text is unreadable.
    pub async fn prepare(&self, bytes: &[u8]) -> Result<PreparedDocument> {
        let pages = self.extractor.extract(bytes).await?;
        let chunks = self.chunker.split(&pages, &self.chunk_config)?;

        if chunks.is_empty() {
            return Err(Error::Unreadable(ExtractError::NoText));
        }

        debug!(
            "Prepared {} pages into {} chunks with {}",
            pages.len(),
            chunks.len(),
            self.chunker.name()
        );
        Ok(PreparedDocument { pages, chunks })
    }

    /// Index `bytes` and install the result in `session`.
    ///
    /// On success the previous document and conversation are replaced. On
    /// failure the session is left as it was.
    pub async fn ingest_into(&self, session: &mut Session, bytes: &[u8]) -> Result<IngestSummary> {
        let prepared = match self.prepare(bytes).await {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!("Ingest failed for session {}: {}", session.id, e);
                return Err(e);
            }
        };

        let page_count = prepared.pages.len();
        let index = match IndexHandle::build(
            prepared.chunks,
            Arc::clone(&self.embedder),
            &self.index_config,
        )
        .await
        {
            Ok(index) => index,
            Err(e) => {
                warn!("Indexing failed for session {}: {}", session.id, e);
                return Err(e);
            }
        };

        let summary = IngestSummary {
            page_count,
            chunk_count: index.len(),
        };

        session.index = Some(index);
        session.memory.clear();
        session.page_count = page_count;

        info!(
            "Session {} indexed {} pages ({} chunks)",
            session.id, summary.page_count, summary.chunk_count
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{KeywordEmbedder, StaticExtractor};
    use pdfchat_core::{ConfigError, EmbedError};

    fn ingestor(pages: &[&str], embedder: KeywordEmbedder) -> Ingestor {
        Ingestor::new(
            Arc::new(StaticExtractor::new(pages)),
            Arc::new(FixedSizeChunker::new()),
            Arc::new(embedder),
            ChunkConfig::default(),
            IndexConfig::default(),
        )
        .unwrap()
    }

    const PAGES: &[&str] = &["Alpha content.", "Beta content.", "Gamma content."];

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new();
        assert!(!session.is_ready());
        assert!(session.memory().is_empty());
        assert_eq!(session.page_count(), 0);
        assert_eq!(session.chunk_count(), 0);
    }

    #[test]
    fn test_ingestor_rejects_invalid_chunk_config() {
        let result = Ingestor::new(
            Arc::new(StaticExtractor::new(PAGES)),
            Arc::new(FixedSizeChunker::new()),
            Arc::new(KeywordEmbedder::new()),
            ChunkConfig {
                chunk_size: 100,
                overlap: 150,
            },
            IndexConfig::default(),
        );
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::OverlapTooLarge { .. }))
        ));
    }

    #[tokio::test]
    async fn test_ingest_three_pages() {
        let ingestor = ingestor(PAGES, KeywordEmbedder::new());
        let mut session = Session::new();

        let summary = ingestor.ingest_into(&mut session, b"%PDF").await.unwrap();

        assert_eq!(summary.page_count, 3);
        assert_eq!(summary.chunk_count, 3);
        assert!(session.is_ready());
        assert_eq!(session.page_count(), 3);
        assert_eq!(session.chunk_count(), 3);
    }

    #[tokio::test]
    async fn test_ingest_unreadable_leaves_session_empty() {
        let ingestor = ingestor(&[], KeywordEmbedder::new());
        let mut session = Session::new();

        let err = ingestor.ingest_into(&mut session, b"%PDF").await.unwrap_err();

        assert!(matches!(err, Error::Unreadable(ExtractError::NoPages)));
        assert!(!session.is_ready());
    }

    #[tokio::test]
    async fn test_ingest_all_blank_pages_is_unreadable() {
        let ingestor = ingestor(&["", ""], KeywordEmbedder::new());
        let mut session = Session::new();

        let err = ingestor.ingest_into(&mut session, b"%PDF").await.unwrap_err();

        assert!(matches!(err, Error::Unreadable(ExtractError::NoText)));
        assert!(!session.is_ready());
    }

    #[tokio::test]
    async fn test_blank_pages_count_but_yield_no_chunks() {
        let ingestor = ingestor(&["Alpha content.", "", "Gamma content."], KeywordEmbedder::new());
        let mut session = Session::new();

        let summary = ingestor.ingest_into(&mut session, b"%PDF").await.unwrap();

        assert_eq!(summary.page_count, 3);
        assert_eq!(summary.chunk_count, 2);
        let pages: Vec<u32> = session
            .index()
            .unwrap()
            .chunks()
            .map(|c| c.source_page)
            .collect();
        assert_eq!(pages, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_failed_reingest_keeps_previous_document() {
        // First build succeeds, every later embedding call fails
        let ingestor = ingestor(PAGES, KeywordEmbedder::failing_after(1));
        let mut session = Session::new();
        ingestor.ingest_into(&mut session, b"%PDF").await.unwrap();
        let first_id = session.index().unwrap().id();
        session.memory.push(ConversationTurn::user("question"));

        let err = ingestor.ingest_into(&mut session, b"%PDF").await.unwrap_err();

        assert!(matches!(err, Error::EmbeddingFailed(EmbedError::Api { status: 429, .. })));
        assert_eq!(session.index().unwrap().id(), first_id);
        assert_eq!(session.memory().len(), 1);
    }

    #[tokio::test]
    async fn test_successful_reingest_clears_memory() {
        let ingestor = ingestor(PAGES, KeywordEmbedder::new());
        let mut session = Session::new();
        ingestor.ingest_into(&mut session, b"%PDF").await.unwrap();
        let first_id = session.index().unwrap().id();
        session.memory.push(ConversationTurn::user("question"));
        session.memory.push(ConversationTurn::assistant("answer"));

        ingestor.ingest_into(&mut session, b"%PDF").await.unwrap();

        assert_ne!(session.index().unwrap().id(), first_id);
        assert!(session.memory().is_empty());
    }

    #[tokio::test]
    async fn test_reset_discards_everything() {
        let ingestor = ingestor(PAGES, KeywordEmbedder::new());
        let mut session = Session::new();
        ingestor.ingest_into(&mut session, b"%PDF").await.unwrap();
        session.memory.push(ConversationTurn::user("question"));

        session.reset();

        assert!(!session.is_ready());
        assert!(session.memory().is_empty());
        assert_eq!(session.page_count(), 0);
    }

    #[tokio::test]
    async fn test_prepare_does_not_embed() {
        let ingestor = ingestor(PAGES, KeywordEmbedder::failing_after(0));

        let prepared = ingestor.prepare(b"%PDF").await.unwrap();

        assert_eq!(prepared.pages.len(), 3);
        assert_eq!(prepared.chunks.len(), 3);
    }

    #[tokio::test]
    async fn test_pdf_ingestor_with_real_document() {
        let bytes = pdfchat_extract::fixture::text_pdf(PAGES).unwrap();
        let ingestor = Ingestor::pdf(
            Arc::new(KeywordEmbedder::new()),
            ChunkConfig::default(),
            IndexConfig::default(),
        )
        .unwrap();
        let mut session = Session::new();

        let summary = ingestor.ingest_into(&mut session, &bytes).await.unwrap();

        assert_eq!(summary.page_count, 3);
        let texts: Vec<&str> = session
            .index()
            .unwrap()
            .chunks()
            .map(|c| c.text.as_str())
            .collect();
        assert_eq!(texts, PAGES);
    }
}
