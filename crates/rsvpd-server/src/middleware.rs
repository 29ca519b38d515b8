use axum::extract::State;
use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use rsvpd_api::ApiError;
use uuid::Uuid;

use crate::server::AppState;

/// Attach a request id to the request extensions and echo it on the
/// response for log correlation.
pub async fn request_id(mut req: Request<Body>, next: Next) -> Response {
    let id = Uuid::new_v4().to_string();
    let value = HeaderValue::from_str(&id)
        .unwrap_or_else(|_| HeaderValue::from_static("invalid-request-id"));
    req.extensions_mut().insert(value.clone());

    let mut res = next.run(req).await;
    res.headers_mut()
        .insert(HeaderName::from_static("x-request-id"), value);
    res
}

/// Admin authentication: a single shared password as a bearer token.
///
/// This mirrors the source system's shared-password login and is
/// deliberately not hardened; anyone holding the password is the admin.
pub async fn admin_auth(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let authorized = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .is_some_and(|token| token == state.admin_password.as_str());

    if authorized {
        next.run(req).await
    } else {
        tracing::debug!(path = %req.uri().path(), "Admin authentication failed");
        ApiError::unauthorized("admin password required").into_response()
    }
}
