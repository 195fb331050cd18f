//! Application routes that fail in every way the mapper distinguishes

use axum::{Extension, Router};
use axum::http::StatusCode;
use axum::routing::get;
use hostkit_core::{ApiError, ArgumentError, Fault};
use hostkit_server::Principal;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
#[error("object reference not set")]
pub struct NullReference;

#[derive(Debug, thiserror::Error)]
#[error("a")]
struct LevelA(#[source] LevelB);

#[derive(Debug, thiserror::Error)]
#[error("b")]
struct LevelB(#[source] LevelC);

#[derive(Debug, thiserror::Error)]
#[error("c")]
struct LevelC;

#[derive(Debug, thiserror::Error)]
#[error("invalid order")]
struct InvalidOrder(#[source] ArgumentError);

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quota {
    pub remaining_calls: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_at: Option<String>,
}

pub fn routes() -> Router {
    Router::new()
        .route("/api/ok", get(|| async { "fine" }))
        .route("/api/argument", get(argument))
        .route("/api/wrapped-argument", get(wrapped_argument))
        .route("/api/unexpected", get(unexpected))
        .route("/api/nested", get(nested))
        .route("/api/text", get(text))
        .route("/api/json", get(quota_exceeded))
        .route("/api/panic", get(panics))
        .route("/api/whoami", get(whoami))
        .route("/api/big", get(|| async { "hostkit ".repeat(512) }))
}

async fn argument() -> Result<(), Fault> {
    Err(ArgumentError::new("bad request from you: x").into())
}

async fn wrapped_argument() -> Result<(), Fault> {
    Err(InvalidOrder(ArgumentError::new("quantity is zero")).into())
}

async fn unexpected() -> Result<(), Fault> {
    Err(NullReference.into())
}

async fn nested() -> Result<(), Fault> {
    Err(LevelA(LevelB(LevelC)).into())
}

async fn text() -> Result<(), Fault> {
    Err(ApiError::text(StatusCode::CONFLICT, "name already taken").into())
}

async fn quota_exceeded() -> Result<(), Fault> {
    let quota = Quota {
        remaining_calls: 0,
        reset_at: None,
    };
    Err(ApiError::json(StatusCode::TOO_MANY_REQUESTS, &quota)?.into())
}

async fn whoami(Extension(principal): Extension<Principal>) -> String {
    principal.subject().unwrap_or_default().to_owned()
}

async fn panics() -> &'static str {
    panic!("handler exploded")
}
