//! Prometheus metrics collection middleware
//!
//! Records `http_requests_total` and `http_request_duration_seconds`, labelled
//! by method, route template and status.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Route template (`/api/v1/hospitals/{id}`) so ids never become labels.
/// This layer wraps the router, so `MatchedPath` is usually not set yet and
/// UUID segments are collapsed by hand.
fn route_label(request: &Request) -> String {
    if let Some(path) = request.extensions().get::<MatchedPath>() {
        return path.as_str().to_string();
    }
    request
        .uri()
        .path()
        .split('/')
        .map(|segment| {
            if Uuid::parse_str(segment).is_ok() {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let route = route_label(&request);

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed().as_secs_f64();

    let status = response.status().as_u16().to_string();
    metrics::counter!(
        "http_requests_total",
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status
    )
    .increment(1);
    metrics::histogram!("http_request_duration_seconds", "method" => method, "route" => route)
        .record(elapsed);

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn ids_are_collapsed_in_labels() {
        let id = Uuid::new_v4();
        let request = Request::builder()
            .uri(format!("/api/v1/hospitals/{}/appointments", id))
            .body(Body::empty())
            .unwrap();
        assert_eq!(route_label(&request), "/api/v1/hospitals/{id}/appointments");
    }
}
