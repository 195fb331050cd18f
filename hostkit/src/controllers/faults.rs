use std::io;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use hostkit_core::{ApiError, ArgumentError, Fault};
use serde::Serialize;

pub fn router() -> Router {
    Router::new()
        .route("/api/faults/argument", get(argument))
        .route("/api/faults/unexpected", get(unexpected))
        .route("/api/faults/text", get(text))
        .route("/api/faults/json", get(json))
        .route("/api/faults/nested", get(nested))
        .route("/api/faults/panic", get(panic))
}

#[derive(Debug, thiserror::Error)]
#[error("order {order} could not be loaded")]
struct OrderLoadFailed {
    order: u32,
    #[source]
    source: StorageUnavailable,
}

#[derive(Debug, thiserror::Error)]
#[error("order storage is unavailable")]
struct StorageUnavailable {
    #[source]
    source: io::Error,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidationFailure {
    field_name: &'static str,
    reason: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<&'static str>,
}

async fn argument() -> Result<String, Fault> {
    Err(ArgumentError::new("bad request from you: x").into())
}

async fn unexpected() -> Result<String, Fault> {
    Err(io::Error::other("object reference not set").into())
}

async fn text() -> Result<String, Fault> {
    Err(ApiError::text(StatusCode::CONFLICT, "order 7 was already shipped").into())
}

async fn json() -> Result<String, Fault> {
    let failure = ValidationFailure {
        field_name: "quantity",
        reason: "must be positive",
        suggestion: None,
    };
    Err(ApiError::json(StatusCode::UNPROCESSABLE_ENTITY, &failure)?.into())
}

async fn nested() -> Result<String, Fault> {
    let root = io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused");
    Err(OrderLoadFailed {
        order: 7,
        source: StorageUnavailable { source: root },
    }
    .into())
}

#[allow(clippy::unused_async)]
async fn panic() -> String {
    panic!("sample handler panicked")
}
