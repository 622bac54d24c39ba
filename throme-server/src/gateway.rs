use async_trait::async_trait;
use serde_json::Value;
use throme_shared::ChatMessage;

use crate::error::GatewayError;

#[derive(Debug, Clone, PartialEq)]
pub struct InferenceRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InferenceResult {
    pub reply_text: Option<String>,
    /// Upstream payload as received, kept for diagnostics.
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaRequest {
    pub model: String,
    pub inputs: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaOutput {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// One round trip to a hosted model. No retries, no caching, no streaming.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    async fn complete(&self, request: InferenceRequest) -> Result<InferenceResult, GatewayError>;

    async fn generate(&self, request: MediaRequest) -> Result<MediaOutput, GatewayError>;
}

