use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use http::HeaderMap;
use http::header::HOST;

use crate::auth::Principal;
use crate::request_id::client_ip;

const NOT_AVAILABLE: &str = "N.A.";

/// Middleware writing one usage event per request on the `usage` target
///
/// The event is written once the response is known, so it carries the
/// status and the authenticated user.
pub async fn usage_middleware(request: Request, next: Next) -> Response {
    let remote_address = client_ip(request.extensions()).map_or_else(|| NOT_AVAILABLE.to_owned(), |ip| ip.to_string());
    let host = host(request.headers()).to_owned();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    tracing::info!(
        target: "usage",
        %method,
        url = %uri,
        host,
        remote_address,
        user = user(&response),
        status = response.status().as_u16(),
        "request handled"
    );

    response
}

fn host(headers: &HeaderMap) -> &str {
    headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(NOT_AVAILABLE)
}

fn user(response: &Response) -> &str {
    response
        .extensions()
        .get::<Principal>()
        .and_then(Principal::user)
        .unwrap_or(NOT_AVAILABLE)
}
