use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// Body accepted on POST. Every field is loosely typed because callers send
/// numbers, arrays or JSON-in-a-string and the server reconciles them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub prompt: Option<Value>,
    #[serde(default)]
    pub model: Option<Value>,
    #[serde(default)]
    pub history: Option<Value>,
    #[serde(default)]
    pub task: Option<Value>,
}

/// Text reply plus the caller's history with this turn appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    pub history: Vec<ChatMessage>,
}

/// Generated media, encoded as a `data:` URL under the key matching its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaReply {
    Image(String),
    Audio(String),
    Video(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn roles_serialize_lowercase() {
        let value = serde_json::to_value(ChatMessage::assistant("hey")).unwrap();
        assert_eq!(value, json!({"role": "assistant", "content": "hey"}));
    }

    #[test]
    fn media_reply_uses_kind_as_key() {
        let reply = MediaReply::Video("data:video/mp4;base64,AA==".into());
        let value = serde_json::to_value(reply).unwrap();
        assert_eq!(value, json!({"video": "data:video/mp4;base64,AA=="}));
    }

    #[test]
    fn error_body_omits_empty_fields() {
        let body = ErrorBody {
            error: "Missing prompt".into(),
            hint: None,
            raw: None,
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"error": "Missing prompt"})
        );
    }
}
