use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use tracing::warn;

/// Admin auth configuration: one shared secret for the whole namespace.
#[derive(Clone)]
pub struct AdminAuth {
    token: String,
}

impl AdminAuth {
    /// Creates the auth config with the shared secret.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

/// Compares two secrets in constant time.
pub fn validate_token(expected: &str, presented: &str) -> bool {
    let a = expected.as_bytes();
    let b = presented.as_bytes();

    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

/// Middleware guarding the admin namespace: every sub-route, nested ones
/// included, requires `Authorization: Bearer <token>`.
pub async fn admin_auth(
    State(auth): State<Arc<AdminAuth>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let presented = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match presented {
        Some(token) if validate_token(&auth.token, token) => next.run(request).await,
        Some(_) => {
            warn!("Rejected admin request: invalid token");
            unauthorized("Invalid password")
        }
        None => {
            warn!("Rejected admin request: missing bearer token");
            unauthorized("Unauthorized")
        }
    }
}
