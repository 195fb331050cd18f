use axum::body::Body;
use axum::response::{IntoResponse, Response};
use http::header::{CONTENT_TYPE, HeaderValue};
use http::StatusCode;
use serde::Serialize;

use crate::fault::Fault;

/// Title used when an error does not provide its own
pub const DEFAULT_TITLE: &str = "An error occurred while processing your request";

const TEXT_PLAIN: &str = "text/plain";
const APPLICATION_JSON: &str = "application/json";

/// Body of a deliberate error response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiPayload {
    /// Written verbatim as `text/plain`
    Text(String),
    /// Serialized as `application/json`
    Json(serde_json::Value),
}

/// Deliberate application error with an explicit status and body
///
/// Handlers return this (or wrap it in a [`Fault`]) to short-circuit with a
/// status other than the default 400/500 classification. The status and
/// payload reach the client unchanged.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{title}")]
pub struct ApiError {
    status: StatusCode,
    title: String,
    payload: ApiPayload,
}

impl ApiError {
    pub fn new(status: StatusCode, payload: ApiPayload) -> Self {
        Self {
            status,
            title: DEFAULT_TITLE.to_owned(),
            payload,
        }
    }

    /// Error answered with a plain-text body
    pub fn text(status: StatusCode, text: impl Into<String>) -> Self {
        Self::new(status, ApiPayload::Text(text.into()))
    }

    /// Error answered with a JSON body
    ///
    /// # Errors
    ///
    /// Returns an error if `payload` cannot be represented as JSON
    pub fn json<T>(status: StatusCode, payload: &T) -> Result<Self, serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        Ok(Self::new(status, ApiPayload::Json(serde_json::to_value(payload)?)))
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub const fn payload(&self) -> &ApiPayload {
        &self.payload
    }

    /// Render the error as an HTTP response
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON payload fails to serialize
    pub fn to_response(&self) -> Result<Response, serde_json::Error> {
        let (content_type, body) = match &self.payload {
            ApiPayload::Text(text) => (TEXT_PLAIN, Body::from(text.clone())),
            ApiPayload::Json(value) => (APPLICATION_JSON, Body::from(serde_json::to_vec(value)?)),
        };

        let mut response = Response::new(body);
        *response.status_mut() = self.status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        Ok(response)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        Fault::from_error(self).into_response()
    }
}
