#![allow(dead_code)]

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Closed set of error codes exposed to API clients.
/// Each code maps to exactly one HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorCode {
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    RateLimited,
    InternalError,
    DatabaseError,
    AiError,
    EmailError,
    ParseError,
    ConfigurationError,
}

impl ApiErrorCode {
    pub fn http_status(self) -> StatusCode {
        match self {
            ApiErrorCode::ValidationError | ApiErrorCode::ParseError => StatusCode::BAD_REQUEST,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ApiErrorCode::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiErrorCode::InternalError
            | ApiErrorCode::DatabaseError
            | ApiErrorCode::AiError
            | ApiErrorCode::EmailError
            | ApiErrorCode::ConfigurationError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ApiErrorCode::ValidationError => "VALIDATION_ERROR",
            ApiErrorCode::NotFound => "NOT_FOUND",
            ApiErrorCode::Unauthorized => "UNAUTHORIZED",
            ApiErrorCode::Forbidden => "FORBIDDEN",
            ApiErrorCode::RateLimited => "RATE_LIMITED",
            ApiErrorCode::InternalError => "INTERNAL_ERROR",
            ApiErrorCode::DatabaseError => "DATABASE_ERROR",
            ApiErrorCode::AiError => "AI_ERROR",
            ApiErrorCode::EmailError => "EMAIL_ERROR",
            ApiErrorCode::ParseError => "PARSE_ERROR",
            ApiErrorCode::ConfigurationError => "CONFIGURATION_ERROR",
        }
    }
}

/// Application-level error type shared by all route handlers.
/// Implements `IntoResponse` so handlers can return `Result<T, ApiError>`;
/// conversion attaches a trace id, logs server-side, and serializes the
/// uniform `{error, code, details?, traceId?, timestamp}` contract.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub code: ApiErrorCode,
    pub details: Option<String>,
    pub trace_id: Option<String>,
}

impl ApiError {
    pub fn new(message: impl Into<String>, code: ApiErrorCode) -> Self {
        Self {
            message: message.into(),
            code,
            details: None,
            trace_id: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(message, ApiErrorCode::ValidationError)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(format!("{resource} not found"), ApiErrorCode::NotFound)
    }

    pub fn unauthorized() -> Self {
        Self::new("Authentication required", ApiErrorCode::Unauthorized)
    }

    pub fn forbidden() -> Self {
        Self::new("Access denied", ApiErrorCode::Forbidden)
    }

    pub fn rate_limited(retry_after_seconds: Option<i64>) -> Self {
        let error = Self::new("Too many requests", ApiErrorCode::RateLimited);
        match retry_after_seconds {
            Some(secs) => error.with_details(format!("Retry after {secs} seconds")),
            None => error,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(message, ApiErrorCode::InternalError)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(message, ApiErrorCode::DatabaseError)
    }

    pub fn ai(message: impl Into<String>) -> Self {
        Self::new(message, ApiErrorCode::AiError)
    }

    pub fn email(message: impl Into<String>) -> Self {
        Self::new(message, ApiErrorCode::EmailError)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(message, ApiErrorCode::ParseError)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(message, ApiErrorCode::ConfigurationError)
    }
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Parse(e) => {
                Self::parse("Failed to parse AI response").with_details(e.to_string())
            }
            other => Self::ai("An AI processing error occurred").with_details(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.http_status();
        let trace_id = self.trace_id.unwrap_or_else(generate_trace_id);

        // Server-side correlation only; clients get message/code/details.
        if status.is_server_error() {
            tracing::error!(
                trace_id = %trace_id,
                code = self.code.as_str(),
                details = ?self.details,
                "{}",
                self.message
            );
        } else {
            tracing::warn!(
                trace_id = %trace_id,
                code = self.code.as_str(),
                "{}",
                self.message
            );
        }

        let mut body = json!({
            "error": self.message,
            "code": self.code,
            "traceId": trace_id,
            "timestamp": Utc::now().to_rfc3339(),
        });
        if let Some(details) = self.details {
            body["details"] = json!(details);
        }

        (status, Json(body)).into_response()
    }
}

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates an opaque trace id for log correlation:
/// base-36 epoch milliseconds plus a 5-char random suffix.
pub fn generate_trace_id() -> String {
    let mut id = to_base36(Utc::now().timestamp_millis());
    let mut rng = rand::thread_rng();
    for _ in 0..5 {
        id.push(BASE36[rng.gen_range(0..BASE36.len())] as char);
    }
    id
}

fn to_base36(mut n: i64) -> String {
    if n <= 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_validation_fields() {
        let err = ApiError::validation("Invalid input").with_details("cv_text is required");
        assert_eq!(err.code, ApiErrorCode::ValidationError);
        assert_eq!(err.code.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Invalid input");
        assert_eq!(err.details.as_deref(), Some("cv_text is required"));
    }

    #[test]
    fn test_not_found_message() {
        let err = ApiError::not_found("Candidate");
        assert_eq!(err.message, "Candidate not found");
        assert_eq!(err.code.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_unauthorized_and_forbidden_defaults() {
        assert_eq!(ApiError::unauthorized().message, "Authentication required");
        assert_eq!(ApiError::forbidden().message, "Access denied");
    }

    #[test]
    fn test_rate_limited_details() {
        let err = ApiError::rate_limited(Some(60));
        assert_eq!(err.code, ApiErrorCode::RateLimited);
        assert_eq!(err.details.as_deref(), Some("Retry after 60 seconds"));
        assert!(ApiError::rate_limited(None).details.is_none());
    }

    #[test]
    fn test_status_mapping_is_total() {
        let cases = [
            (ApiErrorCode::ValidationError, 400),
            (ApiErrorCode::NotFound, 404),
            (ApiErrorCode::Unauthorized, 401),
            (ApiErrorCode::Forbidden, 403),
            (ApiErrorCode::RateLimited, 429),
            (ApiErrorCode::InternalError, 500),
            (ApiErrorCode::DatabaseError, 500),
            (ApiErrorCode::AiError, 500),
            (ApiErrorCode::EmailError, 500),
            (ApiErrorCode::ParseError, 400),
            (ApiErrorCode::ConfigurationError, 500),
        ];
        for (code, status) in cases {
            assert_eq!(code.http_status().as_u16(), status, "{}", code.as_str());
        }
    }

    #[test]
    fn test_code_serializes_as_screaming_snake() {
        let json = serde_json::to_string(&ApiErrorCode::AiError).unwrap();
        assert_eq!(json, "\"AI_ERROR\"");
    }

    #[tokio::test]
    async fn test_validation_response_shape() {
        let response = ApiError::validation("x").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "x");
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["traceId"].is_string());
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_not_found_response() {
        let response = ApiError::not_found("Candidate").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Candidate not found");
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_existing_trace_id_is_kept() {
        let response = ApiError::internal("boom")
            .with_trace_id("trace-123")
            .into_response();
        let body = body_json(response).await;
        assert_eq!(body["traceId"], "trace-123");
    }

    #[tokio::test]
    async fn test_details_omitted_when_absent() {
        let body = body_json(ApiError::validation("x").into_response()).await;
        assert!(body.get("details").is_none());
    }

    #[test]
    fn test_llm_error_normalization() {
        let parse_err = serde_json::from_str::<i32>("not json").unwrap_err();
        let err: ApiError = LlmError::Parse(parse_err).into();
        assert_eq!(err.code, ApiErrorCode::ParseError);

        let err: ApiError = LlmError::EmptyContent.into();
        assert_eq!(err.code, ApiErrorCode::AiError);
        assert!(err.details.is_some());
    }

    #[test]
    fn test_generate_trace_id_unique() {
        let a = generate_trace_id();
        let b = generate_trace_id();
        assert_ne!(a, b);
        assert!(a.len() > 5 && a.len() < 30);
    }

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
