use axum::routing::get;
use axum::{Json, Router};
use hostkit_config::{AuthenticationConfig, SpaConfig};
use hostkit_core::Fault;
use schemars::JsonSchema;
use serde_json::{Value, json};

pub fn router() -> Router {
    Router::new()
        .route("/api/schema/spa-config", get(schema_of::<SpaConfig>))
        .route("/api/schema/authentication-settings", get(schema_of::<AuthenticationConfig>))
}

/// JSON schema of a settings type
///
/// Adds a `$schema` string property so documents validated against it may
/// reference their schema.
async fn schema_of<T: JsonSchema>() -> Result<Json<Value>, Fault> {
    let mut schema = serde_json::to_value(schemars::schema_for!(T))?;

    if let Some(properties) = schema.get_mut("properties").and_then(Value::as_object_mut) {
        properties.insert("$schema".to_owned(), json!({ "type": "string" }));
    }

    Ok(Json(schema))
}
