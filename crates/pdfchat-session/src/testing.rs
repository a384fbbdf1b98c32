//! Fakes shared by the unit tests of this crate.

use async_trait::async_trait;
use pdfchat_core::{
    ChatMessage, DocumentExtractor, EmbedError, Embedder, EmbeddingConfig, EmbeddingOutput,
    ExtractError, GenerateError, LanguageModel, PageBlock,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Groups of synonyms; each group is one embedding dimension.
const VOCABULARY: &[&[&str]] = &[
    &["alpha", "1", "one", "first"],
    &["beta", "2", "two", "second"],
    &["gamma", "3", "three", "third"],
];

/// Embedder that counts vocabulary hits per synonym group.
pub struct KeywordEmbedder {
    fail_after: Option<usize>,
    calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn new() -> Self {
        Self {
            fail_after: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Succeed for the first `calls` calls, then fail.
    pub fn failing_after(calls: usize) -> Self {
        Self {
            fail_after: Some(calls),
            calls: AtomicUsize::new(0),
        }
    }

    fn vector(text: &str) -> Vec<f32> {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        VOCABULARY
            .iter()
            .map(|group| words.iter().filter(|w| group.contains(w)).count() as f32)
            .collect()
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn model_name(&self) -> &str {
        "keyword"
    }

    fn dimension(&self) -> usize {
        VOCABULARY.len()
    }

    async fn embed_text(
        &self,
        texts: &[&str],
        _config: &EmbeddingConfig,
    ) -> Result<Vec<EmbeddingOutput>, EmbedError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_after.is_some_and(|limit| call >= limit) {
            return Err(EmbedError::Api {
                status: 429,
                body: "rate limited".to_string(),
            });
        }
        Ok(texts
            .iter()
            .map(|text| EmbeddingOutput {
                embedding: Self::vector(text),
                token_count: 1,
            })
            .collect())
    }
}

/// Extractor returning fixed pages regardless of input.
pub struct StaticExtractor {
    pages: Vec<String>,
}

impl StaticExtractor {
    pub fn new(pages: &[&str]) -> Self {
        Self {
            pages: pages.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[async_trait]
impl DocumentExtractor for StaticExtractor {
    async fn extract(&self, data: &[u8]) -> Result<Vec<PageBlock>, ExtractError> {
        if data.is_empty() {
            return Err(ExtractError::Parse("empty input".to_string()));
        }
        if self.pages.is_empty() {
            return Err(ExtractError::NoPages);
        }
        Ok(self
            .pages
            .iter()
            .enumerate()
            .map(|(i, text)| PageBlock::new(i as u32 + 1, text.as_str()))
            .collect())
    }
}

/// Model that records every prompt and replies from a script.
pub struct ScriptedModel {
    replies: Mutex<Vec<Result<String, GenerateError>>>,
    pub prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    /// Replies are consumed in order; an exhausted script answers "ok".
    pub fn new(replies: Vec<Result<String, GenerateError>>) -> Self {
        Self {
            replies: Mutex::new(replies),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(reply: &str) -> Self {
        Self::new(vec![Ok(reply.to_string())])
    }

    pub fn failing() -> Self {
        Self::new(vec![Err(GenerateError::Api {
            status: 500,
            body: "upstream error".to_string(),
        })])
    }

    pub fn last_prompt(&self) -> Vec<ChatMessage> {
        self.prompts
            .lock()
            .unwrap()
            .last()
            .cloned()
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, GenerateError> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            Ok("ok".to_string())
        } else {
            replies.remove(0)
        }
    }
}

/// Model that never answers within a test's timeout.
pub struct StalledModel;

#[async_trait]
impl LanguageModel for StalledModel {
    fn model_name(&self) -> &str {
        "stalled"
    }

    async fn generate(&self, _messages: &[ChatMessage]) -> Result<String, GenerateError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok("too late".to_string())
    }
}
