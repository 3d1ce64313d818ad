//! Completion relay.
//!
//! Flattens the conversation into a single context string, sends it with the
//! scope instruction to the completion endpoint, and maps the outcome to a
//! [`Reply`]. No retry; a failure never ends the session.

use std::fmt::Write;
use std::sync::Arc;

use tracing::{debug, error};

use crate::instructions::{CONNECTION_FALLBACK, NO_RESPONSE_FALLBACK, SYSTEM_INSTRUCTION};
use crate::llm::{ChatRequest, ChatResponse, LLMError, LLMProvider, Message, Role};
use crate::models::GenerationSettings;
use crate::session::Turn;

/// Role the scope instruction is sent under.
///
/// The cleared transcript stores the same text as a system turn; the request
/// keeps the assistant role the endpoint has always received.
pub const INSTRUCTION_ROLE: Role = Role::Assistant;

/// Outcome of one relay call, inspected by the caller.
#[derive(Debug)]
pub enum Reply {
    /// The endpoint produced non-empty content.
    Generated(String),
    /// The endpoint answered without usable content.
    Empty,
    /// The call failed; the error is for the user-visible notification.
    Failed(LLMError),
}

impl Reply {
    /// Content to append to the transcript.
    pub fn content(&self) -> &str {
        match self {
            Reply::Generated(content) => content,
            Reply::Empty => NO_RESPONSE_FALLBACK,
            Reply::Failed(_) => CONNECTION_FALLBACK,
        }
    }

    /// Error notification to show alongside the reply, if the call failed.
    pub fn notification(&self) -> Option<String> {
        match self {
            Reply::Failed(e) => Some(format!("Error connecting to the API: {e}")),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Reply::Failed(_))
    }
}

/// Render turns as `"<Role>: <content>\n"` lines, then append the prompt.
pub fn flatten_context(history: &[Turn], prompt: &str) -> String {
    let mut context = String::new();
    for turn in history {
        // Writing to a String cannot fail.
        let _ = writeln!(context, "{}: {}", turn.role().label(), turn.content());
    }
    context.push_str(prompt);
    context
}

/// Sends conversation context to the completion endpoint.
#[derive(Clone)]
pub struct CompletionRelay {
    provider: Arc<dyn LLMProvider>,
}

impl CompletionRelay {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self { provider }
    }

    /// Build the request for `prompt` given the prior history.
    pub fn build_request(
        &self,
        history: &[Turn],
        settings: &GenerationSettings,
        prompt: &str,
    ) -> ChatRequest {
        ChatRequest {
            model: settings.model.provider_id.to_string(),
            messages: vec![
                Message::new(INSTRUCTION_ROLE, SYSTEM_INSTRUCTION),
                Message::new(Role::User, flatten_context(history, prompt)),
            ],
            temperature: settings.params.temperature(),
            top_p: settings.params.top_p(),
            max_tokens: settings.params.max_tokens(),
            stream: false,
        }
    }

    /// Issue the call and return the raw outcome.
    pub async fn complete(
        &self,
        history: &[Turn],
        settings: &GenerationSettings,
        prompt: &str,
    ) -> Result<ChatResponse, LLMError> {
        let request = self.build_request(history, settings, prompt);
        debug!(
            model = %request.model,
            history_turns = history.len(),
            temperature = request.temperature,
            top_p = request.top_p,
            max_tokens = request.max_tokens,
            "Sending completion request"
        );
        self.provider.chat(request).await
    }

    /// Issue the call and map it to a [`Reply`]. Never fails.
    pub async fn generate(
        &self,
        history: &[Turn],
        settings: &GenerationSettings,
        prompt: &str,
    ) -> Reply {
        match self.complete(history, settings, prompt).await {
            Ok(response) => match response.first_content() {
                Some(content) => Reply::Generated(content.to_string()),
                None => {
                    debug!(
                        choices = response.choices.len(),
                        "Completion response had no content"
                    );
                    Reply::Empty
                }
            },
            Err(e) => {
                error!(
                    error = %e,
                    status = ?e.status(),
                    model = settings.model.provider_id,
                    "Error connecting to the API"
                );
                Reply::Failed(e)
            }
        }
    }
}
