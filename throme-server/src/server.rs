use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header::USER_AGENT, HeaderMap},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use throme_shared::{ChatMessage, ChatRequest};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::gateway::{InferenceGateway, MediaRequest};
use crate::history::parse_history;
use crate::llm::HfInference;
use crate::normalizer::{
    assemble_messages, build_media_reply, build_reply, extract_model, extract_prompt, extract_task,
    inference_request,
};
use crate::variants::{Modality, VariantRegistry};

/// Immutable per-process state: the variant table and one gateway per
/// variant whose credential is configured.
pub struct AppState {
    registry: VariantRegistry,
    gateways: HashMap<&'static str, Arc<dyn InferenceGateway>>,
}

impl AppState {
    pub fn new(registry: VariantRegistry) -> Self {
        Self {
            registry,
            gateways: HashMap::new(),
        }
    }

    /// Wires every variant whose credential is present to a Hugging Face client.
    pub fn from_config(registry: VariantRegistry, config: &ServerConfig) -> Self {
        let mut clients: HashMap<&'static str, Arc<dyn InferenceGateway>> = HashMap::new();
        let mut gateways = HashMap::new();
        for variant in registry.iter() {
            let Some(token) = config.credential(variant.credential) else {
                continue;
            };
            let client = clients
                .entry(variant.credential)
                .or_insert_with(|| {
                    let client: Arc<dyn InferenceGateway> = Arc::new(HfInference::new(
                        token.to_string(),
                        &config.router_url,
                        &config.inference_url,
                    ));
                    client
                })
                .clone();
            gateways.insert(variant.name, client);
        }
        Self { registry, gateways }
    }

    /// Routes every registered variant to `gateway`.
    pub fn with_gateway_for_all(mut self, gateway: Arc<dyn InferenceGateway>) -> Self {
        let names: Vec<&'static str> = self.registry.iter().map(|v| v.name).collect();
        for name in names {
            self.gateways.insert(name, gateway.clone());
        }
        self
    }

    pub fn with_gateway(
        mut self,
        variant: &'static str,
        gateway: Arc<dyn InferenceGateway>,
    ) -> Self {
        self.gateways.insert(variant, gateway);
        self
    }

    fn gateway(&self, variant: &str) -> Option<&Arc<dyn InferenceGateway>> {
        self.gateways.get(variant)
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/:variant", get(chat_get).post(chat_post))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn chat_get(
    State(state): State<Arc<AppState>>,
    Path(variant): Path<String>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let field = |key: &str| params.get(key).map(|v| Value::String(v.clone()));
    let request = ChatRequest {
        prompt: field("prompt"),
        model: field("model"),
        history: field("history"),
        task: field("task"),
    };
    handle(&state, &variant, &headers, request).await
}

async fn chat_post(
    State(state): State<Arc<AppState>>,
    Path(variant): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        ChatRequest::default()
    } else {
        serde_json::from_slice::<ChatRequest>(&body)
            .map_err(|e| ApiError::Validation(format!("Invalid JSON body: {e}")))?
    };
    handle(&state, &variant, &headers, request).await
}

async fn handle(
    state: &AppState,
    name: &str,
    headers: &HeaderMap,
    request: ChatRequest,
) -> Result<Response, ApiError> {
    let variant = state
        .registry
        .get(name)
        .ok_or_else(|| ApiError::UnknownVariant(name.to_string()))?;
    let gateway = state.gateway(variant.name).ok_or_else(|| {
        error!(
            "{} not configured, rejecting {} request",
            variant.credential, variant.name
        );
        ApiError::Configuration {
            credential: variant.credential.to_string(),
        }
    })?;

    let prompt = extract_prompt(&request)?;
    let modality = extract_task(&request, variant)?;
    let model = match &variant.modalities {
        Some(table) => table.model_for(modality).to_string(),
        None => extract_model(&request, variant)?,
    };

    info!(variant = variant.name, %model, task = %modality, "handling chat request");

    if modality != Modality::Text {
        let output = gateway
            .generate(MediaRequest {
                model,
                inputs: prompt,
            })
            .await
            .map_err(|e| {
                error!("HF API error: {}", e);
                ApiError::Upstream(e)
            })?;
        let reply = build_media_reply(modality, output).ok_or_else(|| {
            ApiError::Validation(format!("Task '{modality}' does not produce media"))
        })?;
        return Ok(Json(reply).into_response());
    }

    let parsed = parse_history(request.history.as_ref());
    debug!(source = ?parsed.source, turns = parsed.history.len(), "history parsed");

    let user_agent = headers.get(USER_AGENT).and_then(|value| value.to_str().ok());
    let messages = assemble_messages(variant, user_agent, &parsed.history, &prompt);

    let result = gateway
        .complete(inference_request(variant, model, messages))
        .await
        .map_err(|e| {
            error!("HF API error: {}", e);
            ApiError::Upstream(e)
        })?;

    let reply = build_reply(parsed.history, ChatMessage::user(prompt), result).map_err(|e| {
        error!("No reply in HF response for variant {}", variant.name);
        e
    })?;
    Ok(Json(reply).into_response())
}
