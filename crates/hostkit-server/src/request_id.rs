use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, Request};
use http::Extensions;
use tower_http::request_id::RequestId;
use tracing::Span;

/// Trace identifier assigned to the request by the request-id layer
pub fn trace_id(extensions: &Extensions) -> Option<&str> {
    extensions
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
}

/// Peer address, known only when served with connect info
pub fn client_ip(extensions: &Extensions) -> Option<IpAddr> {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(address)| address.ip())
}

/// Span for `TraceLayer` carrying the correlation fields of the request
pub fn make_span(request: &Request) -> Span {
    let client_ip = client_ip(request.extensions()).map(tracing::field::display);

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = trace_id(request.extensions()).unwrap_or_default(),
        client_ip,
    )
}
