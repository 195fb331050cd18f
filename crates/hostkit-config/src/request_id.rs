use serde::Deserialize;

/// Request identifier used as the trace id of error responses
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestIdConfig {
    /// Header read from the request (or generated) and echoed on the response
    #[serde(default = "default_header")]
    pub header: String,
}

impl Default for RequestIdConfig {
    fn default() -> Self {
        Self {
            header: default_header(),
        }
    }
}

fn default_header() -> String {
    "x-request-id".to_string()
}
