//! Audit logging middleware for mutations

use axum::{body::Body, extract::Request, http::Method, middleware::Next, response::Response};

use super::auth::CurrentUser;
use super::request_id::RequestId;

/// Log every POST, PUT and DELETE with its outcome and, when known, the caller
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    if !matches!(method, Method::POST | Method::PUT | Method::DELETE) {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let response = next.run(request).await;

    let actor = response
        .extensions()
        .get::<CurrentUser>()
        .map(|caller| caller.id.to_string())
        .unwrap_or_else(|| "anonymous".to_string());

    tracing::info!(
        target: "audit",
        request_id = %request_id,
        actor = %actor,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        "Mutation request"
    );

    response
}
