use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use colloquy_core::ColloquyError;
use tracing::error;

/// Wraps [`ColloquyError`] so handlers can propagate with `?` and callers
/// receive a flat `{"error": "..."}` body with the right status code.
pub struct ApiError(pub ColloquyError);

impl From<ColloquyError> for ApiError {
    fn from(err: ColloquyError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            ColloquyError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ColloquyError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ColloquyError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            other => {
                error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Convenience alias for handler return types.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_follows_taxonomy() {
        let cases = [
            (
                ColloquyError::Validation("Name and email required".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ColloquyError::NotFound("Session not found".into()),
                StatusCode::NOT_FOUND,
            ),
            (ColloquyError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                ColloquyError::Http("upstream".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ColloquyError::CorruptData("bad file".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            let response = ApiError(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
