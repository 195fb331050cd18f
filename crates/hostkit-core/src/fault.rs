use std::any::{Any, type_name};
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use axum::extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection};
use axum::response::{IntoResponse, Response};

use crate::api_error::ApiError;
use crate::strategy::default_status;

/// Maximum number of levels kept from a cause chain, including the top fault
pub const MAX_CAUSE_DEPTH: usize = 16;

/// How a captured fault is classified
#[derive(Debug, Clone)]
pub enum FaultKind {
    /// Argument or validation failure caused by the caller
    BadInput,
    /// Deliberate application error carrying its own status and payload
    Api(ApiError),
    /// Anything else
    Unexpected,
}

/// Invalid argument supplied by the caller
///
/// Returning this from a handler (directly or as the source of another
/// error) answers the request with `400 Bad Request`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ArgumentError {
    message: String,
}

impl ArgumentError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failure captured while handling a request
///
/// A fault is an immutable snapshot of an error and its cause chain. Any
/// `std::error::Error` converts into one with `?`, so handlers can return
/// `Result<T, Fault>`. The chain is cut at [`MAX_CAUSE_DEPTH`] levels and at
/// the first error that repeats.
#[derive(Debug)]
pub struct Fault {
    kind: FaultKind,
    type_name: Option<Cow<'static, str>>,
    message: String,
    cause: Option<Box<Self>>,
}

/// Response extension carrying the fault a handler failed with
///
/// The exception mapper looks for it on the way out and replaces the
/// placeholder response.
#[derive(Debug, Clone)]
pub struct CapturedFault(pub Arc<Fault>);

impl Fault {
    /// Capture an error together with its `source()` chain
    pub fn from_error<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let top: &(dyn StdError + 'static) = &error;
        Self::from_chain(top, Some(Cow::Borrowed(type_name::<E>())))
    }

    /// Capture an `anyhow` error chain
    pub fn from_anyhow(error: anyhow::Error) -> Self {
        let top: &(dyn StdError + 'static) = &*error;
        Self::from_chain(top, None)
    }

    /// Bad-input fault with the given message
    pub fn bad_input(message: impl Into<String>) -> Self {
        Self::from_error(ArgumentError::new(message))
    }

    /// Unexpected fault with the given message and no type information
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self {
            kind: FaultKind::Unexpected,
            type_name: None,
            message: message.into(),
            cause: None,
        }
    }

    /// Fault for a panic payload caught at the service boundary
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|message| (*message).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "request handler panicked".to_owned());

        Self {
            kind: FaultKind::Unexpected,
            type_name: Some(Cow::Borrowed("panic")),
            message,
            cause: None,
        }
    }

    /// Replace the cause of this fault
    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<Self>) -> Self {
        self.cause = Some(Box::new(cause.into()));
        self.truncate(MAX_CAUSE_DEPTH);
        self
    }

    pub const fn kind(&self) -> &FaultKind {
        &self.kind
    }

    /// Type name of the captured error, when known
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&Self> {
        self.cause.as_deref()
    }

    /// The deliberate application error, if this fault is one
    pub const fn api_error(&self) -> Option<&ApiError> {
        match &self.kind {
            FaultKind::Api(error) => Some(error),
            _ => None,
        }
    }

    /// True when this fault or any of its causes is a bad-input failure
    pub fn is_bad_input(&self) -> bool {
        self.chain().any(|fault| matches!(fault.kind, FaultKind::BadInput))
    }

    /// Iterate over this fault followed by its causes
    pub fn chain(&self) -> impl Iterator<Item = &Self> {
        std::iter::successors(Some(self), |fault| fault.cause())
    }

    /// Number of levels in the chain, including this fault
    pub fn depth(&self) -> usize {
        self.chain().count()
    }

    fn from_chain(top: &(dyn StdError + 'static), top_type: Option<Cow<'static, str>>) -> Self {
        let mut fault = Self::level(top);
        if top_type.is_some() {
            fault.type_name = top_type;
        }

        let mut visited = vec![std::ptr::from_ref(top)];
        let mut causes = Vec::new();
        let mut current = top.source();

        while let Some(error) = current {
            if visited.len() == MAX_CAUSE_DEPTH {
                tracing::debug!(max_depth = MAX_CAUSE_DEPTH, "cause chain truncated");
                break;
            }

            if already_seen(&visited, error) {
                tracing::debug!("cause chain revisits an earlier error, truncated");
                break;
            }
            visited.push(std::ptr::from_ref(error));

            causes.push(Self::level(error));
            current = error.source();
        }

        fault.cause = causes.into_iter().rev().fold(None, |cause, mut level| {
            level.cause = cause;
            Some(Box::new(level))
        });

        fault
    }

    fn level(error: &(dyn StdError + 'static)) -> Self {
        let (kind, type_name) = recognize(error);
        Self {
            kind,
            type_name,
            message: error.to_string(),
            cause: None,
        }
    }

    fn truncate(&mut self, max_depth: usize) {
        let mut current = self;
        let mut depth = 1;
        loop {
            if depth >= max_depth {
                current.cause = None;
                return;
            }
            match current.cause.as_deref_mut() {
                Some(next) => {
                    current = next;
                    depth += 1;
                }
                None => return,
            }
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl<E> From<E> for Fault
where
    E: StdError + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::from_error(error)
    }
}

impl IntoResponse for Fault {
    fn into_response(self) -> Response {
        let status = self.api_error().map_or_else(|| default_status(&self), ApiError::status);
        let mut response = status.into_response();
        response.extensions_mut().insert(CapturedFault(Arc::new(self)));
        response
    }
}

/// Classify one level of an error chain by its concrete type
fn recognize(error: &(dyn StdError + 'static)) -> (FaultKind, Option<Cow<'static, str>>) {
    if let Some(api) = error.downcast_ref::<ApiError>() {
        return (FaultKind::Api(api.clone()), Some(named::<ApiError>()));
    }

    let bad_input = if error.is::<ArgumentError>() {
        Some(named::<ArgumentError>())
    } else if error.is::<PathRejection>() {
        Some(named::<PathRejection>())
    } else if error.is::<QueryRejection>() {
        Some(named::<QueryRejection>())
    } else if error.is::<JsonRejection>() {
        Some(named::<JsonRejection>())
    } else if error.is::<FormRejection>() {
        Some(named::<FormRejection>())
    } else {
        None
    };

    match bad_input {
        Some(name) => (FaultKind::BadInput, Some(name)),
        None => (FaultKind::Unexpected, None),
    }
}

fn named<T>() -> Cow<'static, str> {
    Cow::Borrowed(type_name::<T>())
}

// Wide-pointer comparison on purpose: nested zero-sized errors share an
// address and only differ by vtable.
#[allow(ambiguous_wide_pointer_comparisons)]
fn already_seen(visited: &[*const (dyn StdError + 'static)], error: &(dyn StdError + 'static)) -> bool {
    visited.iter().any(|seen| std::ptr::eq(*seen, error))
}
