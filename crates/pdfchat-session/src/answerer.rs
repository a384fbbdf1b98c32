//! Retrieval-augmented question answering over a session.

use pdfchat_core::{
    Answer, ConfigError, ConversationTurn, Error, GenerateError, LanguageModel, Result,
};
use pdfchat_store::{IndexHandle, DEFAULT_TOP_K};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::prompt::build_messages;
use crate::session::Session;

/// Retrieval and generation settings.
#[derive(Debug, Clone)]
pub struct AnswerConfig {
    /// Passages retrieved per question
    pub top_k: usize,
    /// Upper bound on the generation call
    pub request_timeout: Duration,
}

impl AnswerConfig {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::ZeroTopK);
        }
        Ok(())
    }
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Answers questions from a session's index and conversation.
pub struct Answerer {
    model: Arc<dyn LanguageModel>,
    config: AnswerConfig,
}

impl Answerer {
    pub fn new(model: Arc<dyn LanguageModel>, config: AnswerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { model, config })
    }

    /// Answer `question` and record the exchange in the session's memory.
    ///
    /// Memory gains the question and the answer together or not at all.
    pub async fn ask(&self, session: &mut Session, question: &str) -> Result<Answer> {
        let index = session.index.as_ref().ok_or(Error::NotReady)?;
        let memory = &mut session.memory;

        let len_before = memory.len();
        memory.push(ConversationTurn::user(question));

        let result = self
            .answer(index, question, &memory.turns()[..len_before])
            .await;

        match result {
            Ok(answer) => {
                memory.push(ConversationTurn::assistant(answer.text.as_str()));
                Ok(answer)
            }
            Err(e) => {
                memory.truncate(len_before);
                warn!("Question failed, memory rolled back: {}", e);
                Err(e)
            }
        }
    }

    async fn answer(
        &self,
        index: &IndexHandle,
        question: &str,
        history: &[ConversationTurn],
    ) -> Result<Answer> {
        let hits = index.search(question, self.config.top_k).await?;
        debug!(
            "Retrieved {} passages from pages {:?}",
            hits.len(),
            hits.iter().map(|h| h.chunk.source_page).collect::<Vec<_>>()
        );

        let messages = build_messages(question, &hits, history);

        let timeout = self.config.request_timeout;
        let text = tokio::time::timeout(timeout, self.model.generate(&messages))
            .await
            .map_err(|_| GenerateError::Timeout(timeout))??;

        debug!("{} answered in {} chars", self.model.model_name(), text.len());
        Ok(Answer {
            text,
            source_chunks: hits,
        })
    }
}
