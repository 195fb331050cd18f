//! Exception-to-HTTP mapping for hostkit
//!
//! Handlers fail with a [`Fault`]; the server's exception mapper classifies
//! it with the configured [`ErrorStrategy`] and writes the response.

#![allow(clippy::must_use_candidate)]

mod api_error;
mod body;
mod fault;
mod strategy;

pub use api_error::{ApiError, ApiPayload, DEFAULT_TITLE};
pub use body::{ErrorMessage, ProblemDetails};
pub use fault::{ArgumentError, CapturedFault, Fault, FaultKind, MAX_CAUSE_DEPTH};
pub use strategy::{ErrorStrategy, LegacyErrorStrategy, ProblemDetailsStrategy, default_status};
