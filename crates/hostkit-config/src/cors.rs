use serde::Deserialize;

/// Cross-origin settings for the web API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// `"*"` or explicit origins
    #[serde(default)]
    pub origins: AnyOrList,
    /// `"*"` or explicit method names
    #[serde(default)]
    pub methods: AnyOrList,
    /// `"*"` or explicit header names
    #[serde(default)]
    pub headers: AnyOrList,
    #[serde(default)]
    pub expose_headers: Vec<String>,
    #[serde(default)]
    pub credentials: bool,
    /// Preflight cache lifetime in seconds
    #[serde(default)]
    pub max_age: Option<u64>,
}

impl CorsConfig {
    /// # Errors
    ///
    /// Returns an error when credentials are combined with wildcard origins
    /// or wildcard exposed headers, or when a method or header name is malformed
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.credentials && self.origins.is_any() {
            anyhow::bail!("server.cors: credentials require an explicit origins list");
        }

        if self.credentials && self.exposes_any() {
            anyhow::bail!("server.cors: credentials cannot be combined with wildcard expose_headers");
        }

        if let AnyOrList::List(origins) = &self.origins {
            for origin in origins {
                http::HeaderValue::from_str(origin)
                    .map_err(|e| anyhow::anyhow!("server.cors: invalid origin '{origin}': {e}"))?;
            }
        }

        if let AnyOrList::List(methods) = &self.methods {
            for method in methods {
                http::Method::from_bytes(method.as_bytes())
                    .map_err(|e| anyhow::anyhow!("server.cors: invalid method '{method}': {e}"))?;
            }
        }

        let listed = match &self.headers {
            AnyOrList::Any => &[][..],
            AnyOrList::List(headers) => headers.as_slice(),
        };
        for header in listed.iter().chain(&self.expose_headers) {
            http::HeaderName::from_bytes(header.as_bytes())
                .map_err(|e| anyhow::anyhow!("server.cors: invalid header '{header}': {e}"))?;
        }

        Ok(())
    }

    /// Whether `expose_headers` contains the wildcard
    pub fn exposes_any(&self) -> bool {
        self.expose_headers.iter().any(|header| header == "*")
    }
}

/// Either the wildcard `"*"` or a list of values
///
/// A list containing `"*"` is treated as the wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawAnyOrList")]
pub enum AnyOrList {
    #[default]
    Any,
    List(Vec<String>),
}

impl AnyOrList {
    pub const fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAnyOrList {
    One(String),
    Many(Vec<String>),
}

impl From<RawAnyOrList> for AnyOrList {
    fn from(raw: RawAnyOrList) -> Self {
        let values = match raw {
            RawAnyOrList::One(value) => vec![value],
            RawAnyOrList::Many(values) => values,
        };

        if values.iter().any(|value| value == "*") {
            Self::Any
        } else {
            Self::List(values)
        }
    }
}
