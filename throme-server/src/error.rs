use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use throme_shared::ErrorBody;

pub const UPSTREAM_HINT: &str = "Check HF_ACCESS_TOKEN and model availability";

/// Errors surfaced to HTTP callers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{credential} not configured on server")]
    Configuration { credential: String },
    #[error("{0}")]
    Validation(String),
    #[error("unknown variant: {0}")]
    UnknownVariant(String),
    #[error("upstream inference call failed")]
    Upstream(#[from] GatewayError),
    #[error("No reply in HF response")]
    EmptyReply { raw: Value },
}

/// Failures talking to the hosted inference API.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Configuration { .. } | ApiError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::UnknownVariant(_) => StatusCode::NOT_FOUND,
            ApiError::EmptyReply { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.to_string();
        let body = match self {
            ApiError::Configuration { credential } => ErrorBody {
                error,
                hint: Some(format!("Set {credential} in the server environment")),
                raw: None,
            },
            ApiError::Upstream(_) => ErrorBody {
                error,
                hint: Some(UPSTREAM_HINT.to_string()),
                raw: None,
            },
            ApiError::EmptyReply { raw } => ErrorBody {
                error,
                hint: None,
                raw: Some(raw),
            },
            ApiError::Validation(_) | ApiError::UnknownVariant(_) => ErrorBody {
                error,
                hint: None,
                raw: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            ApiError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::UnknownVariant("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::EmptyReply { raw: Value::Null }.status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(GatewayError::Request("timeout".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Configuration {
                credential: "HF_ACCESS_TOKEN".into()
            }
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn upstream_message_hides_detail() {
        let err = ApiError::from(GatewayError::Status {
            status: 401,
            body: "secret".into(),
        });
        assert!(!err.to_string().contains("secret"));
    }
}
