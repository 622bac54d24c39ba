pub mod config;
pub mod error;
pub mod gateway;
pub mod history;
pub mod llm;
pub mod normalizer;
pub mod server;
pub mod variants;

pub use error::{ApiError, GatewayError};
pub use gateway::{InferenceGateway, InferenceRequest, InferenceResult, MediaOutput, MediaRequest};
pub use server::{app, AppState};
pub use variants::{PromptVariant, VariantRegistry};
