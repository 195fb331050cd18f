use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use hostkit_config::{APP_INFO_ENV_PATH, APP_INFO_PATH, ProgramConfig};
use serde::Serialize;

/// Program settings published to clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    pub app: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    pub version: &'static str,
}

impl From<&ProgramConfig> for AppInfo {
    fn from(program: &ProgramConfig) -> Self {
        Self {
            app: program.app.clone(),
            group: program.group.clone(),
            environment: program.environment.clone(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// `GET /api/app-info` and `GET /api/app-info/env`
pub fn app_info_router(program: &ProgramConfig) -> Router {
    Router::new()
        .route(APP_INFO_PATH, get(app_info))
        .route(APP_INFO_ENV_PATH, get(environment))
        .with_state(Arc::new(AppInfo::from(program)))
}

async fn app_info(State(info): State<Arc<AppInfo>>) -> Json<AppInfo> {
    Json(info.as_ref().clone())
}

async fn environment(State(info): State<Arc<AppInfo>>) -> Json<Option<String>> {
    Json(info.environment.clone())
}
