//! Caller-supplied conversation history.
//!
//! History arrives as a JSON array, as JSON inside a string, or as a loose
//! comma-separated string. Parsing never fails: each shape falls through to
//! the next one, ending at an empty history.

use serde_json::Value;
use throme_shared::{ChatMessage, MessageRole};
use tracing::{debug, warn};

/// Prior turns of a chat. Never holds a `system` message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationHistory(Vec<ChatMessage>);

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: impl IntoIterator<Item = ChatMessage>) -> Self {
        Self(
            messages
                .into_iter()
                .filter(|msg| msg.role != MessageRole::System)
                .collect(),
        )
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.0
    }
}

/// Which branch of the fallback chain produced the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorySource {
    Absent,
    Structured,
    EmbeddedJson,
    Delimited,
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedHistory {
    pub history: ConversationHistory,
    pub source: HistorySource,
}

impl ParsedHistory {
    fn new(messages: Vec<ChatMessage>, source: HistorySource) -> Self {
        Self {
            history: ConversationHistory::from_messages(messages),
            source,
        }
    }

    fn empty(source: HistorySource) -> Self {
        Self {
            history: ConversationHistory::new(),
            source,
        }
    }
}

pub fn parse_history(raw: Option<&Value>) -> ParsedHistory {
    match raw {
        None | Some(Value::Null) => ParsedHistory::empty(HistorySource::Absent),
        Some(Value::Array(items)) => match structured(items) {
            Some(messages) => ParsedHistory::new(messages, HistorySource::Structured),
            None => {
                warn!(entries = items.len(), "history array is malformed, ignoring it");
                ParsedHistory::empty(HistorySource::Discarded)
            }
        },
        Some(Value::String(text)) => parse_history_text(text),
        Some(other) => {
            warn!(kind = json_kind(other), "unsupported history type, ignoring it");
            ParsedHistory::empty(HistorySource::Discarded)
        }
    }
}

fn parse_history_text(text: &str) -> ParsedHistory {
    if text.trim().is_empty() {
        return ParsedHistory::empty(HistorySource::Absent);
    }
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(text) {
        if let Some(messages) = structured(&items) {
            return ParsedHistory::new(messages, HistorySource::EmbeddedJson);
        }
    }
    debug!("history is not a JSON message list, splitting on commas");
    ParsedHistory::new(delimited(text), HistorySource::Delimited)
}

fn structured(items: &[Value]) -> Option<Vec<ChatMessage>> {
    items
        .iter()
        .map(|item| serde_json::from_value::<ChatMessage>(item.clone()).ok())
        .collect()
}

fn delimited(text: &str) -> Vec<ChatMessage> {
    text.split(',')
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(ChatMessage::user)
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
