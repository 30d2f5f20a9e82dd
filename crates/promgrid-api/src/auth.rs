//! Basic-auth middleware for the target routes.
//!
//! One shared credential pair for the whole service, checked per request.
//! Failures answer 403 with a JSON message instead of 401, which keeps
//! browsers from popping their credential dialog.

use axum::Json;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::debug;

/// Shared credential pair checked on every `/targets` request.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

impl AuthConfig {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Read the credential pair from `PROMD_USER` / `PROMD_PASSWORD`,
    /// falling back to the stock `prometheus`/`prometheus` pair.
    pub fn from_env() -> Self {
        let var = |key: &str| std::env::var(key).unwrap_or_else(|_| "prometheus".to_string());
        Self::new(var("PROMD_USER"), var("PROMD_PASSWORD"))
    }

    fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

/// Decode an `Authorization: Basic ...` header value into its credential pair.
fn decode_basic(header: &str) -> Option<(String, String)> {
    let encoded = header.strip_prefix("Basic ")?;
    let decoded = BASE64.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Middleware guarding the target routes.
pub async fn require_auth(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(decode_basic)
        .is_some_and(|(username, password)| auth.matches(&username, &password));

    if authorized {
        next.run(request).await
    } else {
        debug!("rejected request with missing or bad credentials");
        (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({ "message": "Unauthorized access" })),
        )
            .into_response()
    }
}
