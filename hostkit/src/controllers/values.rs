use axum::Router;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::routing::get;
use hostkit_core::{ArgumentError, Fault};
use jiff::Timestamp;
use serde::Deserialize;

pub fn router() -> Router {
    Router::new()
        .route("/api/values", get(now))
        .route("/api/values/datetime", get(datetime))
        .route("/api/values/{id}", get(by_id))
}

/// Current UTC time
async fn now() -> String {
    Timestamp::now().to_string()
}

#[derive(Debug, Deserialize)]
struct DateTimeQuery {
    datetime: String,
}

/// Echo a timestamp normalized to UTC
async fn datetime(query: Result<Query<DateTimeQuery>, QueryRejection>) -> Result<String, Fault> {
    let Query(query) = query?;

    let timestamp: Timestamp = query
        .datetime
        .parse()
        .map_err(|e| ArgumentError::new(format!("'{}' is not a valid datetime: {e}", query.datetime)))?;

    Ok(timestamp.to_string())
}

async fn by_id(id: Result<Path<u64>, PathRejection>) -> Result<String, Fault> {
    let Path(id) = id?;
    Ok(format!("value {id}"))
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use http::StatusCode;
    use tower::ServiceExt;

    use super::*;

    async fn get(path: &str) -> (StatusCode, String) {
        let response = router()
            .oneshot(http::Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn now_is_a_utc_timestamp() {
        let (status, body) = get("/api/values").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.parse::<Timestamp>().is_ok(), "{body}");
        assert!(body.ends_with('Z'), "{body}");
    }

    #[tokio::test]
    async fn datetime_is_normalized() {
        let (status, body) = get("/api/values/datetime?datetime=2024-03-10T12:30:00%2B02:00").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "2024-03-10T10:30:00Z");
    }

    // Without the exception mapper only the placeholder status is visible
    #[tokio::test]
    async fn bad_datetime_is_bad_input() {
        let (status, _) = get("/api/values/datetime?datetime=yesterday").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get("/api/values/datetime").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn id_must_be_numeric() {
        let (status, body) = get("/api/values/42").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "value 42");

        let (status, _) = get("/api/values/forty-two").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
