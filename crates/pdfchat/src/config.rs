//! Configuration handling for pdfchat.
//!
//! Every field has a default, so a missing file or a partial one is valid.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use pdfchat_core::{ChunkConfig, ConfigError, EmbeddingConfig};
use pdfchat_session::AnswerConfig;
use pdfchat_store::{IndexConfig, DEFAULT_TOP_K};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Remote provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Chunking-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Chunk length (characters)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks (characters)
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

fn default_chunk_size() -> usize {
    ChunkConfig::DEFAULT_CHUNK_SIZE
}

fn default_overlap() -> usize {
    ChunkConfig::DEFAULT_OVERLAP
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
        }
    }
}

/// Retrieval-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Passages retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

/// Embedding and chat provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// OpenAI-compatible server
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: usize,

    /// Texts per embedding request
    #[serde(default = "default_embedding_batch_size")]
    pub embedding_batch_size: usize,

    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    #[serde(default)]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Upper bound on each provider call (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    pdfchat_embed::openai::DEFAULT_BASE_URL.to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_embedding_model() -> String {
    pdfchat_embed::openai::DEFAULT_MODEL.to_string()
}

fn default_embedding_dimension() -> usize {
    pdfchat_embed::openai::DEFAULT_DIMENSION
}

fn default_embedding_batch_size() -> usize {
    EmbeddingConfig::default().batch_size
}

fn default_chat_model() -> String {
    pdfchat_llm::openai::DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    pdfchat_llm::openai::DEFAULT_MAX_TOKENS
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            embedding_model: default_embedding_model(),
            embedding_dimension: default_embedding_dimension(),
            embedding_batch_size: default_embedding_batch_size(),
            chat_model: default_chat_model(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ProviderConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .with_context(|| format!("Set {} to your API key", self.api_key_env))
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

const SAMPLE_TOML: &str = r#"# pdfchat configuration

[chunking]
# Chunk length in characters
chunk_size = 1000
# Characters shared by consecutive chunks of a page
overlap = 200

[retrieval]
# Passages retrieved per question
top_k = 3

[provider]
base_url = "https://api.openai.com"
# Environment variable holding the API key
api_key_env = "OPENAI_API_KEY"
embedding_model = "text-embedding-ada-002"
embedding_dimension = 1536
embedding_batch_size = 32
chat_model = "gpt-3.5-turbo"
temperature = 0.0
max_tokens = 512
request_timeout_secs = 60

[logging]
level = "info"
"#;

impl Config {
    /// Load from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load from `path`, or the default location when `None`.
    ///
    /// A missing file yields the defaults.
    pub fn load_from(path: Option<PathBuf>) -> Result<Self> {
        let Some(path) = path.or_else(Self::config_path) else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Default config file path.
    pub fn config_path() -> Option<PathBuf> {
        config_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn sample_toml() -> &'static str {
        SAMPLE_TOML
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.chunk_config().validate()?;
        self.answer_config().validate()?;
        if self.provider.embedding_batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        Ok(())
    }

    pub fn chunk_config(&self) -> ChunkConfig {
        ChunkConfig {
            chunk_size: self.chunking.chunk_size,
            overlap: self.chunking.overlap,
        }
    }

    pub fn index_config(&self) -> IndexConfig {
        IndexConfig {
            embedding: EmbeddingConfig {
                batch_size: self.provider.embedding_batch_size,
            },
            request_timeout: self.provider.request_timeout(),
        }
    }

    pub fn answer_config(&self) -> AnswerConfig {
        AnswerConfig {
            top_k: self.retrieval.top_k,
            request_timeout: self.provider.request_timeout(),
        }
    }
}

/// Get the config directory for pdfchat.
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("PDFCHAT_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }

    ProjectDirs::from("", "", "pdfchat").map(|dirs| dirs.config_dir().to_path_buf())
}
