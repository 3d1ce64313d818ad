//! Session-scoped conversation state.
//!
//! A [`ChatSession`] owns one [`Conversation`] and the [`GenerationSettings`]
//! chosen for it. Every operation takes the session explicitly; nothing is held
//! in ambient global state.

mod store;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::instructions::{GREETING, SYSTEM_INSTRUCTION};
use crate::llm::Role;
use crate::models::GenerationSettings;
use crate::relay::{CompletionRelay, Reply};

pub use store::{SessionHandle, SessionStore};

// ============================================================================
// Turn
// ============================================================================

/// One message in a conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

// ============================================================================
// Conversation
// ============================================================================

/// What the presentation layer must do after a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[must_use = "the transcript must be redrawn after a reset"]
pub enum Render {
    /// Discard what is on screen and draw the whole transcript again.
    Full,
}

/// Ordered history of turns for one session.
///
/// Append-only, except for [`Conversation::reset`] which replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// A fresh conversation holding only the assistant greeting.
    pub fn new() -> Self {
        Self {
            turns: vec![Turn::assistant(GREETING)],
        }
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Replace the history with the single system instruction turn.
    pub fn reset(&mut self) -> Render {
        self.turns = vec![Turn::system(SYSTEM_INSTRUCTION)];
        Render::Full
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

// ============================================================================
// ChatSession
// ============================================================================

/// Context object for one conversation: history plus generation settings.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: String,
    pub conversation: Conversation,
    pub settings: GenerationSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    pub fn new(id: impl Into<String>, settings: GenerationSettings) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            conversation: Conversation::new(),
            settings,
            created_at: now,
            updated_at: now,
        }
    }

    /// Submit a user message: ask the relay, then record the exchange.
    ///
    /// The relay sees the history as it was before this submission, followed
    /// by the prompt text. The user turn and the reply turn are appended
    /// together once the relay returns, so dropping this future mid-call
    /// leaves the conversation untouched. The returned [`Reply`] carries the
    /// content that was appended and, on failure, the error to show the user.
    pub async fn submit(&mut self, relay: &CompletionRelay, prompt: impl Into<String>) -> Reply {
        let prompt = prompt.into();
        let reply = relay
            .generate(self.conversation.turns(), &self.settings, &prompt)
            .await;

        self.conversation.append(Turn::user(prompt));
        self.conversation
            .append(Turn::assistant(reply.content().to_string()));
        self.updated_at = Utc::now();

        debug!(
            session_id = %self.id,
            turns = self.conversation.len(),
            failed = reply.is_failure(),
            "Message submitted"
        );

        reply
    }

    /// Clear the history (the "clear chat" action).
    pub fn clear(&mut self) -> Render {
        self.updated_at = Utc::now();
        debug!(session_id = %self.id, "Conversation cleared");
        self.conversation.reset()
    }
}
