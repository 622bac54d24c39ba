//! Turns raw request fields into an inference call, and the call's result
//! back into a response body.

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use serde_json::Value;
use throme_shared::{ChatMessage, ChatReply, ChatRequest, MediaReply};

use crate::error::ApiError;
use crate::gateway::{InferenceRequest, InferenceResult, MediaOutput};
use crate::history::ConversationHistory;
use crate::variants::{Modality, PromptVariant};

pub const MISSING_PROMPT: &str = "Missing prompt (GET ?prompt=... or POST { prompt })";
pub const MISSING_MODEL: &str = "Missing model (GET ?model=... or POST { model })";

/// Scalars are stringified; arrays, objects and null count as absent.
fn field_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn extract_prompt(request: &ChatRequest) -> Result<String, ApiError> {
    field_text(request.prompt.as_ref())
        .filter(|prompt| !prompt.trim().is_empty())
        .ok_or_else(|| ApiError::Validation(MISSING_PROMPT.to_string()))
}

pub fn extract_model(request: &ChatRequest, variant: &PromptVariant) -> Result<String, ApiError> {
    if let Some(model) = variant.fixed_model {
        return Ok(model.to_string());
    }
    field_text(request.model.as_ref())
        .map(|model| model.trim().to_string())
        .filter(|model| !model.is_empty())
        .ok_or_else(|| ApiError::Validation(MISSING_MODEL.to_string()))
}

/// Variants without a modality table always answer in text.
pub fn extract_task(request: &ChatRequest, variant: &PromptVariant) -> Result<Modality, ApiError> {
    if variant.modalities.is_none() {
        return Ok(Modality::Text);
    }
    let task = field_text(request.task.as_ref())
        .filter(|task| !task.trim().is_empty())
        .unwrap_or_else(|| "text".to_string());
    Modality::parse(&task).ok_or_else(|| {
        ApiError::Validation(format!(
            "Unknown task '{}' (expected text, image, voice or video)",
            task.trim().to_lowercase()
        ))
    })
}

/// `[system] ++ history ++ [user]`, in that order.
pub fn assemble_messages(
    variant: &PromptVariant,
    user_agent: Option<&str>,
    history: &ConversationHistory,
    prompt: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(variant.system_prompt(user_agent)));
    messages.extend(history.messages().iter().cloned());
    messages.push(ChatMessage::user(prompt));
    messages
}

pub fn inference_request(
    variant: &PromptVariant,
    model: String,
    messages: Vec<ChatMessage>,
) -> InferenceRequest {
    InferenceRequest {
        model,
        messages,
        max_tokens: variant.max_tokens,
        temperature: variant.temperature,
    }
}

pub fn build_reply(
    history: ConversationHistory,
    user_message: ChatMessage,
    result: InferenceResult,
) -> Result<ChatReply, ApiError> {
    let reply = match result.reply_text {
        Some(text) if !text.is_empty() => text,
        _ => return Err(ApiError::EmptyReply { raw: result.raw }),
    };

    let mut updated = history.into_messages();
    updated.push(user_message);
    updated.push(ChatMessage::assistant(reply.clone()));

    Ok(ChatReply {
        reply,
        history: updated,
    })
}

/// `None` for text, which is answered through [`build_reply`].
pub fn build_media_reply(modality: Modality, output: MediaOutput) -> Option<MediaReply> {
    let data_url = format!(
        "data:{};base64,{}",
        output.content_type,
        BASE64_STANDARD.encode(&output.bytes)
    );
    match modality {
        Modality::Text => None,
        Modality::Image => Some(MediaReply::Image(data_url)),
        Modality::Voice => Some(MediaReply::Audio(data_url)),
        Modality::Video => Some(MediaReply::Video(data_url)),
    }
}
