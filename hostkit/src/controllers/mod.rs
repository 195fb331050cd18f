//! Sample controllers exercising the hosting pipeline

mod faults;
mod schema;
mod values;

use axum::Router;

/// Routes mounted as the web API
pub fn router() -> Router {
    Router::new()
        .merge(values::router())
        .merge(schema::router())
        .merge(faults::router())
}
