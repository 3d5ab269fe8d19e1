//! Error types for the review server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use review_engine::ReviewError;
use serde::Serialize;
use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Sender not allowed: {0}")]
    Forbidden(String),

    #[error("Error decoding PDF: {0}")]
    Decode(String),

    #[error(transparent)]
    Review(#[from] ReviewError),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    code: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ServerError::Forbidden(_) => (StatusCode::FORBIDDEN, "SENDER_NOT_ALLOWED"),
            ServerError::Decode(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DECODE_ERROR"),
            ServerError::Review(ReviewError::Extraction(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "EXTRACTION_ERROR")
            }
            ServerError::Review(ReviewError::Llm(_) | ReviewError::MalformedResponse(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "LLM_ERROR")
            }
            ServerError::Review(ReviewError::Task(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = ErrorResponse {
            detail: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_engine::ExtractionError;

    #[test]
    fn test_status_mapping() {
        let forbidden = ServerError::Forbidden("x@example.com".to_string()).into_response();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

        let decode = ServerError::Decode("bad padding".to_string()).into_response();
        assert_eq!(decode.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let empty: ServerError = ReviewError::from(ExtractionError::EmptyDocument).into();
        assert_eq!(empty.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_review_errors_keep_their_prefix() {
        let err: ServerError = ReviewError::from(ExtractionError::EmptyDocument).into();
        assert!(err.to_string().starts_with("PDF extraction error"));
    }
}
