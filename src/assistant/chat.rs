//! Chat with the shop-keeper.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::assistant::ChatBackend;

/// Persona the chat backend is instructed to play.
pub const SYSTEM_INSTRUCTION: &str = "You are 'Father Dust', a wise, knowledgeable, and slightly whimsical guide who runs an online store for digital guides. Your persona is friendly, encouraging, and you enjoy promoting thought and learning. Respond to users conversationally, offer helpful advice, and gently guide them towards relevant topics covered in your store's guides without being pushy. Keep your answers concise and helpful.";

/// First message shown in a new conversation.
pub const WELCOME_MESSAGE: &str = "Welcome to my thinkery! Feel free to ask me anything about personal development, life skills, or my guides.";

/// Reply shown when the backend fails.
pub const APOLOGY_MESSAGE: &str =
    "Apologies, my thoughts seem to be scattered at the moment. Could you try asking again?";

/// Who said something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The customer
    User,

    /// The shop-keeper
    Model,
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author
    pub role: ChatRole,

    /// Message text
    pub text: String,
}

impl ChatMessage {
    /// A message from the customer.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    /// A message from the shop-keeper.
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// A single conversation.
///
/// The transcript is what the customer sees, starting with the welcome message and including
/// apologies. The history is what the backend sees: only exchanges it actually answered.
#[derive(Debug)]
pub struct ChatSession<B> {
    backend: Arc<B>,
    system_instruction: String,
    transcript: Vec<ChatMessage>,
    history: Vec<ChatMessage>,
}

impl<B: ChatBackend> ChatSession<B> {
    /// Start a conversation with the shop-keeper persona.
    pub fn new(backend: Arc<B>) -> Self {
        Self::with_instruction(backend, SYSTEM_INSTRUCTION)
    }

    /// Start a conversation with a custom system instruction.
    pub fn with_instruction(backend: Arc<B>, system_instruction: impl Into<String>) -> Self {
        Self {
            backend,
            system_instruction: system_instruction.into(),
            transcript: vec![ChatMessage::model(WELCOME_MESSAGE)],
            history: Vec::new(),
        }
    }

    /// Send a message and return the reply. Blank input is ignored and returns `None`.
    ///
    /// Backend failures are logged and answered with an apology.
    pub async fn send(&mut self, text: &str) -> Option<String> {
        let text = text.trim();

        if text.is_empty() {
            return None;
        }

        let message = ChatMessage::user(text);

        self.transcript.push(message.clone());
        self.history.push(message);

        let result = self
            .backend
            .reply(&self.system_instruction, &self.history)
            .await;

        let reply = match result {
            Ok(reply) => {
                debug!(turns = self.history.len(), "chat reply received");

                self.history.push(ChatMessage::model(reply.clone()));

                reply
            }
            Err(err) => {
                warn!(error = %err, "chat backend failed");

                self.history.pop();

                APOLOGY_MESSAGE.to_string()
            }
        };

        self.transcript.push(ChatMessage::model(reply.clone()));

        Some(reply)
    }

    /// Everything shown to the customer so far.
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Conversation as the backend knows it.
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// System instruction sent with every request.
    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }
}

/// Owns at most one chat session, started on the first question.
#[derive(Debug)]
pub struct Concierge<B> {
    backend: Arc<B>,
    session: Option<ChatSession<B>>,
}

impl<B: ChatBackend> Concierge<B> {
    /// Create a concierge. No session exists until the first question.
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            session: None,
        }
    }

    /// Ask a question, starting a session if there is none yet.
    pub async fn ask(&mut self, text: &str) -> Option<String> {
        let backend = &self.backend;

        self.session
            .get_or_insert_with(|| ChatSession::new(Arc::clone(backend)))
            .send(text)
            .await
    }

    /// The current session, if one has been started.
    pub fn session(&self) -> Option<&ChatSession<B>> {
        self.session.as_ref()
    }

    /// Drop the current session; the next question starts a fresh one.
    pub fn reset(&mut self) {
        self.session = None;
    }
}
