//! HTTP error mapping for API handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use notemark_core::AppError;
use serde_json::json;

/// Wrapper translating [`AppError`] into JSON error responses.
///
/// Client errors carry their message through to the body; storage and
/// serialization failures are logged and collapsed to a generic 500 so
/// internal details stay out of responses.
#[derive(Debug)]
pub struct HttpError(pub AppError);

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl HttpError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match &self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.0.to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::NotFound => (StatusCode::NOT_FOUND, self.0.to_string()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Database(_)
            | AppError::Serialization(_)
            | AppError::StorageMessage(_)
            | AppError::SlugExhausted(_)
            | AppError::Internal => {
                tracing::error!("Request failed: {}", self.0);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_keep_their_messages() {
        let cases = [
            (
                AppError::BadRequest("Title is required".to_string()),
                StatusCode::BAD_REQUEST,
                "Title is required",
            ),
            (
                AppError::Unauthorized,
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
            ),
            (
                AppError::Forbidden("You do not own this note".to_string()),
                StatusCode::FORBIDDEN,
                "You do not own this note",
            ),
            (AppError::NotFound, StatusCode::NOT_FOUND, "Not found"),
            (
                AppError::Conflict("A note with this title already exists".to_string()),
                StatusCode::CONFLICT,
                "A note with this title already exists",
            ),
        ];

        for (err, expected_status, expected_message) in cases {
            let (status, message) = HttpError(err).status_and_message();
            assert_eq!(status, expected_status, "message: {expected_message:?}");
            assert_eq!(message, expected_message);
        }
    }

    #[test]
    fn storage_errors_collapse_to_generic_500() {
        let cases = [
            AppError::StorageMessage("index row vanished".to_string()),
            AppError::SlugExhausted(5_000),
            AppError::Internal,
        ];

        for err in cases {
            let (status, message) = HttpError(err).status_and_message();
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(
                message, "Internal server error",
                "storage detail must not leak into the body"
            );
        }
    }

    #[tokio::test]
    async fn response_body_uses_error_envelope() {
        let response =
            HttpError(AppError::BadRequest("Title is required".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body, json!({ "error": "Title is required" }));
    }
}
