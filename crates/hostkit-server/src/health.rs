use axum::Json;
use axum::extract::State;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Health {
    status: &'static str,
    app: String,
}

impl Health {
    pub fn new(app: &str) -> Self {
        Self {
            status: "ok",
            app: app.to_owned(),
        }
    }
}

/// Liveness probe
pub async fn health_handler(State(health): State<Health>) -> Json<Health> {
    Json(health)
}
