//! Assistant
//!
//! AI collaborators used by the storefront: cover art generation and the shop-keeper chat. Both
//! are traits so the storefront can run against the Gemini client, a mock, or nothing at all.
//! Nothing in here is consulted when pricing a cart.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

pub mod chat;
pub mod covers;
pub mod gemini;

pub use chat::{ChatMessage, ChatRole, ChatSession, Concierge};
pub use covers::{CoverJob, CoverUpdate, CoverWarmup, WarmupDelays, WarmupSummary};
pub use gemini::{GeminiClient, GeminiConfig};

/// Errors that can occur when talking to an AI backend.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned a non-2xx response or an unexpected body.
    #[error("unexpected response from backend: {0}")]
    UnexpectedResponse(String),

    /// The backend answered without any usable content.
    #[error("backend returned an empty response")]
    EmptyResponse,
}

/// Generates cover artwork.
#[automock]
#[async_trait]
pub trait CoverGenerator: Send + Sync {
    /// Generate a cover for the given prompt, returning an image URL (possibly a data URL).
    async fn generate_cover(&self, prompt: &str) -> Result<String, AssistantError>;
}

/// Answers chat messages.
#[automock]
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Reply to the last user message in `history`.
    async fn reply(
        &self,
        system_instruction: &str,
        history: &[ChatMessage],
    ) -> Result<String, AssistantError>;
}
