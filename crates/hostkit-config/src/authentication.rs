use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Authentication for the web API
///
/// When any bearer provider is configured, every web-API route outside
/// `anonymous_paths` requires a valid JWT.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AuthenticationConfig {
    /// Explicit default scheme, tried first
    #[serde(default)]
    pub default: Option<String>,
    /// Negotiate (Kerberos); not available in this host and rejected when set
    #[serde(default)]
    pub use_kerberos: bool,
    /// JWT bearer providers
    #[serde(default)]
    pub bearer_tokens: Vec<JwtBearerConfig>,
    /// Path prefixes served without a token
    #[serde(default = "default_anonymous_paths")]
    pub anonymous_paths: Vec<String>,
}

impl Default for AuthenticationConfig {
    fn default() -> Self {
        Self {
            default: None,
            use_kerberos: false,
            bearer_tokens: Vec::new(),
            anonymous_paths: default_anonymous_paths(),
        }
    }
}

impl AuthenticationConfig {
    pub fn has_any(&self) -> bool {
        !self.bearer_tokens.is_empty()
    }

    /// Scheme tried first
    ///
    /// An explicit default wins, otherwise the provider name when exactly one
    /// bearer provider exists.
    pub fn default_scheme(&self) -> Option<&str> {
        if let Some(default) = self.default.as_deref() {
            return Some(default);
        }

        match self.bearer_tokens.as_slice() {
            [only] => Some(only.provider.as_str()),
            _ => None,
        }
    }

    /// Names of every configured scheme
    pub fn schemes(&self) -> Vec<&str> {
        self.bearer_tokens.iter().map(|token| token.provider.as_str()).collect()
    }

    /// Whether `path` is served without authentication
    pub fn is_anonymous(&self, path: &str) -> bool {
        self.anonymous_paths.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// # Errors
    ///
    /// Returns an error if Kerberos is requested, a bearer provider is
    /// incomplete, provider names collide, the default names an unknown
    /// scheme, or an anonymous path is not absolute
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.use_kerberos {
            anyhow::bail!(
                "authentication.use_kerberos: Negotiate is not supported by hostkit; terminate it at the fronting proxy"
            );
        }

        for token in &self.bearer_tokens {
            token.validate()?;
        }

        let schemes = self.schemes();
        for (index, scheme) in schemes.iter().enumerate() {
            if schemes[..index].contains(scheme) {
                anyhow::bail!("authentication: scheme '{scheme}' is configured more than once");
            }
        }

        if let Some(default) = self.default.as_deref()
            && !schemes.contains(&default)
        {
            anyhow::bail!("authentication.default '{default}' does not name a configured scheme");
        }

        if let Some(path) = self.anonymous_paths.iter().find(|path| !path.starts_with('/')) {
            anyhow::bail!("authentication.anonymous_paths: '{path}' must start with '/'");
        }

        Ok(())
    }
}

/// JWT bearer provider
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct JwtBearerConfig {
    /// Scheme name of this provider
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Token authority; signing keys are discovered from
    /// `<authority>/.well-known/openid-configuration`
    #[serde(default)]
    pub authority: Option<String>,
    #[serde(default = "default_true")]
    pub validate_issuer: bool,
    #[serde(default = "default_true")]
    pub validate_audience: bool,
    /// Check `exp` and `nbf`
    #[serde(default = "default_true")]
    pub validate_lifetime: bool,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
}

impl JwtBearerConfig {
    /// OpenID Connect discovery document of the authority
    pub fn metadata_address(&self) -> Option<String> {
        self.authority
            .as_deref()
            .map(|authority| format!("{}/.well-known/openid-configuration", authority.trim_end_matches('/')))
    }

    /// # Errors
    ///
    /// Returns an error when the authority is missing or not a URL, or when
    /// an issuer/audience is required but absent
    pub fn validate(&self) -> anyhow::Result<()> {
        let provider = &self.provider;

        let authority = self
            .authority
            .as_deref()
            .filter(|authority| !authority.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("bearer provider '{provider}': authority is required"))?;

        url::Url::parse(authority)
            .map_err(|e| anyhow::anyhow!("bearer provider '{provider}': invalid authority '{authority}': {e}"))?;

        if self.validate_issuer && is_blank(self.issuer.as_deref()) {
            anyhow::bail!("bearer provider '{provider}': issuer is required when validate_issuer is set");
        }

        if self.validate_audience && is_blank(self.audience.as_deref()) {
            anyhow::bail!("bearer provider '{provider}': audience is required when validate_audience is set");
        }

        Ok(())
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

fn default_anonymous_paths() -> Vec<String> {
    vec![crate::APP_INFO_PATH.to_string()]
}

fn default_provider() -> String {
    "Bearer".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_true() -> bool {
    true
}
