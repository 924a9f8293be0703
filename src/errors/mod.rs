//! Error handling module for the site backend.
//!
//! Every handler failure is converted here into a fixed status code and a
//! `{ "error": message }` body. Internal detail stays in the server log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Public error messages.
pub mod messages {
    pub const RESOURCE_NOT_FOUND: &str = "Resource not found";
    pub const FILE_NOT_FOUND: &str = "File not found";
    pub const LOCALE_NOT_SUPPORTED: &str = "Locale not supported";
    pub const UNIVERSITY_NOT_FOUND: &str = "University not found";
    pub const INTERNAL_ERROR: &str = "Internal server error";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Id unknown, not a pdf, or no file reference
    ResourceNotFound(String),
    /// Catalogued file absent from the public root
    FileMissing(String),
    /// Locale path segment is not a supported locale
    LocaleNotSupported(String),
    /// University path segment is not a partner university
    UniversityNotFound(String),
    /// Anything else; the detail is logged, never returned
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ResourceNotFound(_)
            | AppError::FileMissing(_)
            | AppError::LocaleNotSupported(_)
            | AppError::UniversityNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the message returned to the client.
    pub fn public_message(&self) -> &'static str {
        match self {
            AppError::ResourceNotFound(_) => messages::RESOURCE_NOT_FOUND,
            AppError::FileMissing(_) => messages::FILE_NOT_FOUND,
            AppError::LocaleNotSupported(_) => messages::LOCALE_NOT_SUPPORTED,
            AppError::UniversityNotFound(_) => messages::UNIVERSITY_NOT_FOUND,
            AppError::Internal(_) => messages::INTERNAL_ERROR,
        }
    }

    /// Get the detail message.
    pub fn detail(&self) -> &str {
        match self {
            AppError::ResourceNotFound(msg)
            | AppError::FileMissing(msg)
            | AppError::LocaleNotSupported(msg)
            | AppError::UniversityNotFound(msg)
            | AppError::Internal(msg) => msg,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.public_message(), self.detail())
    }
}

impl std::error::Error for AppError {}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Internal(detail) => tracing::error!("Internal error: {}", detail),
            AppError::FileMissing(detail) => tracing::warn!("Catalogued file missing: {}", detail),
            _ => tracing::debug!("{}", self),
        }

        let body = ErrorResponse {
            error: self.public_message().to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_shapes() {
        let response = AppError::ResourceNotFound("does-not-exist".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(response).await["error"], "Resource not found");

        let response = AppError::FileMissing("public/x.pdf".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(response).await["error"], "File not found");
    }

    #[tokio::test]
    async fn test_internal_detail_not_leaked() {
        let response =
            AppError::Internal("permission denied: /srv/public/secret.pdf".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_of(response).await;
        assert_eq!(body, serde_json::json!({ "error": "Internal server error" }));
    }
}
