//! Language-model backends for pdfchat.
//!
//! | Backend | Endpoint | Default model |
//! |---------|----------|---------------|
//! | [`OpenAiChatModel`] | `POST {base_url}/v1/chat/completions` | `gpt-3.5-turbo` |

pub mod openai;

pub use openai::OpenAiChatModel;
