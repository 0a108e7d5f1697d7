use actix_web::{error, http::StatusCode, web, HttpRequest, HttpResponse};
use serde_json::error::Category;
use thiserror::Error;
use validator::ValidationErrors;

use crate::models::ErrorResponse;
use crate::services::{EmbeddingError, LlmError, StoreError};

/// Errors surfaced by HTTP handlers, rendered as `ErrorResponse` JSON
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidJson(_) => "invalid_json",
            ApiError::Validation(_) => "validation_failed",
            ApiError::Conflict(_) | ApiError::Store(StoreError::DuplicateId(_)) => "conflict",
            ApiError::PayloadTooLarge(_) => "payload_too_large",
            ApiError::Store(_) => "vector_store_error",
            ApiError::Embedding(_) => "embedding_error",
            ApiError::Llm(_) => "llm_error",
        }
    }
}

impl error::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict(_) | ApiError::Store(StoreError::DuplicateId(_)) => StatusCode::CONFLICT,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        HttpResponse::build(status).json(ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}

/// Handle JSON payload errors
///
/// Well-formed JSON that does not fit the request type (missing field, wrong
/// type, negative count) is a validation failure. Bodies over the configured
/// limit are 413. Everything else is malformed input.
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    classify_payload_error(err).into()
}

fn classify_payload_error(err: error::JsonPayloadError) -> ApiError {
    match err {
        error::JsonPayloadError::Deserialize(e) if e.classify() == Category::Data => {
            ApiError::Validation(e.to_string())
        }
        error::JsonPayloadError::Overflow { limit } => {
            ApiError::PayloadTooLarge(format!("body exceeds the {} byte limit", limit))
        }
        error::JsonPayloadError::OverflowKnownLength { length, limit } => ApiError::PayloadTooLarge(format!(
            "body of {} bytes exceeds the {} byte limit",
            length, limit
        )),
        other => ApiError::InvalidJson(other.to_string()),
    }
}

/// JSON extractor config with a body limit and the API error mapping
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(handle_json_payload_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Store(StoreError::DuplicateId("a".into())).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Validation("top_k".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::Llm(LlmError::Unauthorized).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    fn deserialize_error(body: &str) -> error::JsonPayloadError {
        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Body {
            id: String,
            top_k: usize,
        }
        let err = serde_json::from_str::<Body>(body).unwrap_err();
        error::JsonPayloadError::Deserialize(err)
    }

    #[test]
    fn test_payload_error_classification() {
        let missing = classify_payload_error(deserialize_error(r#"{"top_k": 3}"#));
        assert_eq!(missing.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let negative = classify_payload_error(deserialize_error(r#"{"id": "a", "top_k": -1}"#));
        assert_eq!(negative.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let syntax = classify_payload_error(deserialize_error(r#"{"id": "a""#));
        assert_eq!(syntax.kind(), "invalid_json");
        assert_eq!(syntax.status_code(), StatusCode::BAD_REQUEST);

        let overflow = classify_payload_error(error::JsonPayloadError::OverflowKnownLength {
            length: 4096,
            limit: 1024,
        });
        assert_eq!(overflow.kind(), "payload_too_large");
        assert_eq!(overflow.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(ApiError::InvalidJson("eof".into()).kind(), "invalid_json");
        assert_eq!(
            ApiError::Embedding(EmbeddingError::ApiError("down".into())).kind(),
            "embedding_error"
        );
    }
}
