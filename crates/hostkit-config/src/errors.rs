use serde::Deserialize;

/// Shape of the body written for unhandled failures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorShape {
    /// `statusCode` / `type` / `message` / `innerError`
    #[default]
    Legacy,
    /// `status` / `title` / `detail` / `type` / `traceId`
    ProblemDetails,
}

impl ErrorShape {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::ProblemDetails => "problem_details",
        }
    }
}

/// Exception mapping configuration
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorsConfig {
    /// Body shape, fixed for the lifetime of the process
    #[serde(default)]
    pub shape: ErrorShape,
    /// Prefix problem-details `detail` with the error type
    #[serde(default)]
    pub detail_includes_type: bool,
    /// Do not log bad-input failures (useful for public APIs)
    #[serde(default)]
    pub suppress_bad_input_logging: bool,
}
