//! Wire types for OpenAI-compatible chat completions.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub stream: bool,
}

/// A message in a chat completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// The role of a message sender.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Capitalised speaker label used in transcripts.
    pub fn label(self) -> &'static str {
        match self {
            Role::System => "System",
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A chat completion response.
///
/// Every field is optional on the wire; presence is checked by
/// [`ChatResponse::first_content`].
#[derive(Debug, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// Content of the first choice, if present and non-empty.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
            .filter(|content| !content.is_empty())
    }
}

/// A single completion choice.
#[derive(Debug, Deserialize)]
pub struct Choice {
    #[serde(default, deserialize_with = "null_as_default")]
    pub index: u32,
    #[serde(default)]
    pub message: Option<ResponseMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The message carried by a completion choice.
#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Token usage statistics. Counters the endpoint omits read as zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub prompt_tokens: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completion_tokens: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_tokens: u32,
}

/// Treat an explicit `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_serialization() {
        let request = ChatRequest {
            model: "google/gemma-2-9b-it".to_string(),
            messages: vec![
                Message::new(Role::Assistant, "Only discuss symptoms."),
                Message::new(Role::User, "I have a cough"),
            ],
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 120,
            stream: false,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "google/gemma-2-9b-it");
        assert_eq!(json["messages"][0]["role"], "assistant");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "I have a cough");
        assert_eq!(json["max_tokens"], 120);
        assert_eq!(json["stream"], false);
        assert!(json.get("top_p").is_some());
        assert!(json.get("temperature").is_some());
    }

    #[test]
    fn test_chat_response_deserialization() {
        let json = r#"{
            "id": "chatcmpl-123",
            "choices": [
                {
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": "Possible flu; consider rest and hydration."
                    },
                    "finish_reason": "stop"
                }
            ],
            "usage": {
                "prompt_tokens": 10,
                "completion_tokens": 8,
                "total_tokens": 18
            }
        }"#;

        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.id.as_deref(), Some("chatcmpl-123"));
        assert_eq!(response.choices.len(), 1);
        assert_eq!(
            response.first_content(),
            Some("Possible flu; consider rest and hydration.")
        );
        assert_eq!(response.choices[0].finish_reason.as_deref(), Some("stop"));

        let usage = response.usage.unwrap();
        assert_eq!(usage.total_tokens, 18);
    }

    #[test]
    fn test_first_content_absent_cases() {
        let no_choices: ChatResponse = serde_json::from_str("{}").unwrap();
        assert!(no_choices.first_content().is_none());

        let empty_list: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(empty_list.first_content().is_none());

        let null_content: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#,
        )
        .unwrap();
        assert!(null_content.first_content().is_none());

        let empty_content: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": ""}}]}"#).unwrap();
        assert!(empty_content.first_content().is_none());

        let no_message: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"index": 0}]}"#).unwrap();
        assert!(no_message.first_content().is_none());

        let null_choices: ChatResponse =
            serde_json::from_str(r#"{"id": "x", "choices": null}"#).unwrap();
        assert!(null_choices.choices.is_empty());
        assert!(null_choices.first_content().is_none());
    }

    #[test]
    fn test_partial_usage_keeps_content() {
        let json = r#"{
            "choices": [{"index": null, "message": {"role": "assistant", "content": "Rest."}}],
            "usage": {"prompt_tokens": 5, "total_tokens": null}
        }"#;

        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.first_content(), Some("Rest."));

        let usage = response.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 5);
        assert_eq!(usage.completion_tokens, 0);
        assert_eq!(usage.total_tokens, 0);
    }

    #[test]
    fn test_role_labels() {
        assert_eq!(Role::System.label(), "System");
        assert_eq!(Role::User.to_string(), "User");
        assert_eq!(Role::Assistant.label(), "Assistant");
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"assistant\"").unwrap(),
            Role::Assistant
        );
    }
}
