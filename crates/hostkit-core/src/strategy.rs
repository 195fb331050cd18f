use std::fmt::Debug;

use http::StatusCode;

use crate::api_error::{ApiError, ApiPayload, DEFAULT_TITLE};
use crate::body::{ErrorMessage, ProblemDetails};
use crate::fault::Fault;

/// Status for a fault that is not a deliberate application error
///
/// Bad input anywhere in the chain answers 400; everything else 500.
pub fn default_status(fault: &Fault) -> StatusCode {
    if fault.is_bad_input() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Turns a captured fault into the status and body sent to the client
///
/// One strategy is selected at startup and shared by every request.
/// Implementations only decide the body shape; the status rule lives in
/// [`ErrorStrategy::convert`] and is shared by all of them.
pub trait ErrorStrategy: Send + Sync + Debug {
    /// Body for a fault already classified with `status`
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be serialized
    fn body(&self, fault: &Fault, status: StatusCode, trace_id: Option<&str>) -> Result<ApiPayload, serde_json::Error>;

    /// Classify a fault
    ///
    /// Deliberate application errors pass through verbatim.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be serialized
    fn convert(&self, fault: &Fault, trace_id: Option<&str>) -> Result<ApiError, serde_json::Error> {
        if let Some(api) = fault.api_error() {
            return Ok(api.clone());
        }

        let status = default_status(fault);
        let payload = self.body(fault, status, trace_id)?;
        Ok(ApiError::new(status, payload))
    }
}

/// Answers with the legacy [`ErrorMessage`] body
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyErrorStrategy;

impl ErrorStrategy for LegacyErrorStrategy {
    fn body(&self, fault: &Fault, status: StatusCode, _trace_id: Option<&str>) -> Result<ApiPayload, serde_json::Error> {
        let message = ErrorMessage::from_fault(status, fault);
        Ok(ApiPayload::Json(serde_json::to_value(message)?))
    }
}

/// Answers with a [`ProblemDetails`] body
#[derive(Debug, Clone, Copy, Default)]
pub struct ProblemDetailsStrategy {
    /// Prefix `detail` with the fault's type name
    pub detail_includes_type: bool,
}

impl ErrorStrategy for ProblemDetailsStrategy {
    fn body(&self, fault: &Fault, status: StatusCode, trace_id: Option<&str>) -> Result<ApiPayload, serde_json::Error> {
        let detail = match fault.type_name() {
            Some(type_name) if self.detail_includes_type => format!("{type_name}: {}", fault.message()),
            _ => fault.message().to_owned(),
        };

        let problem = ProblemDetails {
            status: status.as_u16(),
            title: DEFAULT_TITLE.to_owned(),
            detail: Some(detail),
            problem_type: fault.type_name().map(ToOwned::to_owned),
            trace_id: trace_id.map(ToOwned::to_owned),
        };
        Ok(ApiPayload::Json(serde_json::to_value(problem)?))
    }
}
