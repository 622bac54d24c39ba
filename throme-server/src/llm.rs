use async_openai::{
    error::OpenAIError,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::{json, Value};
use throme_shared::{ChatMessage, MessageRole};
use tracing::{debug, error, info};

use crate::error::GatewayError;
use crate::gateway::{
    InferenceGateway, InferenceRequest, InferenceResult, MediaOutput, MediaRequest,
};

/// Hugging Face hosted inference. Chat goes through the router's
/// OpenAI-compatible endpoint; media tasks hit the per-model inference API.
///
/// Chat replies are kept as untyped JSON so that a reply without usable text
/// can be reported with the payload exactly as the router sent it.
pub struct HfInference {
    http: reqwest::Client,
    router_url: String,
    inference_url: String,
    api_key: String,
}

impl HfInference {
    pub fn new(api_key: String, router_url: &str, inference_url: &str) -> Self {
        info!("Initializing Hugging Face client against {}", router_url);
        Self {
            http: reqwest::Client::new(),
            router_url: router_url.trim_end_matches('/').to_string(),
            inference_url: inference_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn convert_to_openai_message(
        msg: ChatMessage,
    ) -> Result<ChatCompletionRequestMessage, OpenAIError> {
        let message = match msg.role {
            MessageRole::System => ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(msg.content)
                    .build()?,
            ),
            MessageRole::User => ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(msg.content)
                    .build()?,
            ),
            MessageRole::Assistant => ChatCompletionRequestMessage::Assistant(
                ChatCompletionRequestAssistantMessageArgs::default()
                    .content(msg.content)
                    .build()?,
            ),
        };
        Ok(message)
    }

    fn chat_request(request: InferenceRequest) -> Result<CreateChatCompletionRequest, OpenAIError> {
        let messages = request
            .messages
            .into_iter()
            .map(Self::convert_to_openai_message)
            .collect::<Result<Vec<_>, _>>()?;

        CreateChatCompletionRequestArgs::default()
            .model(request.model)
            .messages(messages)
            .max_tokens(request.max_tokens)
            .temperature(request.temperature)
            .build()
    }
}

/// Text of the first choice, if the router sent any.
fn reply_text(raw: &Value) -> Option<String> {
    raw.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl InferenceGateway for HfInference {
    async fn complete(&self, request: InferenceRequest) -> Result<InferenceResult, GatewayError> {
        let chat_request =
            Self::chat_request(request).map_err(|e| GatewayError::Request(e.to_string()))?;

        debug!(
            model = %chat_request.model,
            messages = chat_request.messages.len(),
            "chat completion request"
        );

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.router_url))
            .bearer_auth(&self.api_key)
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| {
                error!("Hugging Face chat completion failed: {:?}", e);
                GatewayError::Request(e.to_string())
            })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        if !status.is_success() {
            error!(%status, model = %chat_request.model, "chat completion rejected");
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let raw: Value =
            serde_json::from_str(&text).map_err(|e| GatewayError::Parse(e.to_string()))?;

        Ok(InferenceResult {
            reply_text: reply_text(&raw),
            raw,
        })
    }

    async fn generate(&self, request: MediaRequest) -> Result<MediaOutput, GatewayError> {
        let url = format!("{}/models/{}", self.inference_url, request.model);
        debug!(model = %request.model, "media generation request");

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&json!({ "inputs": request.inputs }))
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(%status, model = %request.model, "media generation failed");
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        Ok(MediaOutput {
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}
