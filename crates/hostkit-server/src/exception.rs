//! Last-resort mapping of handler faults to HTTP responses

use std::any::Any;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use hostkit_config::{ErrorShape, ErrorsConfig};
use hostkit_core::{CapturedFault, ErrorStrategy, Fault, LegacyErrorStrategy, ProblemDetailsStrategy};
use http::{Method, StatusCode, Uri};

use crate::request_id::trace_id;

/// Marker on a response whose fault has already been written
///
/// A mapper that sees it leaves the response alone, so the status line is
/// set once even when several mappers are stacked.
#[derive(Debug, Clone, Copy)]
pub struct MappedFault;

/// Strategy selected by `server.errors.shape`
pub fn strategy_from_config(errors: &ErrorsConfig) -> Arc<dyn ErrorStrategy> {
    match errors.shape {
        ErrorShape::Legacy => Arc::new(LegacyErrorStrategy),
        ErrorShape::ProblemDetails => Arc::new(ProblemDetailsStrategy {
            detail_includes_type: errors.detail_includes_type,
        }),
    }
}

#[derive(Clone, Debug)]
pub struct ExceptionState {
    strategy: Arc<dyn ErrorStrategy>,
    suppress_bad_input_logging: bool,
}

impl ExceptionState {
    pub fn new(strategy: Arc<dyn ErrorStrategy>) -> Self {
        Self {
            strategy,
            suppress_bad_input_logging: false,
        }
    }

    pub fn from_config(errors: &ErrorsConfig) -> Self {
        Self {
            strategy: strategy_from_config(errors),
            suppress_bad_input_logging: errors.suppress_bad_input_logging,
        }
    }

    fn map(&self, fault: &Fault, trace_id: Option<&str>, method: &Method, uri: &Uri) -> Response {
        let rendered = self.strategy.convert(fault, trace_id).and_then(|error| {
            self.log(fault, error.status(), trace_id, method, uri);
            error.to_response()
        });

        let mut response = rendered.unwrap_or_else(|e| {
            tracing::error!(
                error = %e,
                fault = %fault,
                request_id = trace_id.unwrap_or_default(),
                "failed to serialize error response"
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        });

        response.extensions_mut().insert(MappedFault);
        response
    }

    fn log(&self, fault: &Fault, status: StatusCode, trace_id: Option<&str>, method: &Method, uri: &Uri) {
        let error_type = fault.type_name().unwrap_or("unknown");
        let request_id = trace_id.unwrap_or_default();
        let causes: Vec<&str> = fault.chain().skip(1).map(Fault::message).collect();

        if fault.api_error().is_some() {
            tracing::debug!(%method, %uri, %status, request_id, "application error response");
        } else if status.is_server_error() {
            tracing::error!(
                %method,
                %uri,
                %status,
                request_id,
                error_type,
                ?causes,
                "unhandled error: {fault}"
            );
        } else if !self.suppress_bad_input_logging {
            tracing::warn!(
                %method,
                %uri,
                %status,
                request_id,
                error_type,
                ?causes,
                "bad request: {fault}"
            );
        }
    }
}

/// Middleware replacing a fault placeholder with the mapped error response
pub async fn exception_middleware(State(state): State<ExceptionState>, request: Request, next: Next) -> Response {
    let trace_id = trace_id(request.extensions()).map(ToOwned::to_owned);
    let method = request.method().clone();
    let uri = request.uri().clone();

    let mut response = next.run(request).await;

    if response.extensions().get::<MappedFault>().is_some() {
        return response;
    }

    let Some(CapturedFault(fault)) = response.extensions_mut().remove::<CapturedFault>() else {
        return response;
    };

    // Extensions set by inner layers, such as the principal, stay on the response
    let (parts, _) = response.into_parts();
    let mut mapped = state.map(&fault, trace_id.as_deref(), &method, &uri);
    mapped.extensions_mut().extend(parts.extensions);
    mapped
}

/// `CatchPanicLayer` handler turning a panic into a fault placeholder
#[allow(clippy::needless_pass_by_value)]
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    Fault::from_panic(&*payload).into_response()
}
