use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::fault::Fault;

/// Legacy error body
///
/// Similar in spirit to problem details but flatter. Each level of the
/// fault's cause chain becomes a nested `innerError` with the same status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessage {
    pub status_code: u16,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_error: Option<Box<ErrorMessage>>,
}

impl ErrorMessage {
    pub fn from_fault(status: StatusCode, fault: &Fault) -> Self {
        Self {
            status_code: status.as_u16(),
            error_type: fault.type_name().map(ToOwned::to_owned),
            message: Some(fault.message().to_owned()),
            inner_error: fault.cause().map(|cause| Box::new(Self::from_fault(status, cause))),
        }
    }

    /// Number of levels including this one
    pub fn depth(&self) -> usize {
        std::iter::successors(Some(self), |message| message.inner_error.as_deref()).count()
    }
}

/// Standards-shaped error body with a trace identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    pub status: u16,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub problem_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}
