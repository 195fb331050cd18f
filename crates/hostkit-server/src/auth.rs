//! JWT bearer authentication for the web API
//!
//! Signing keys are discovered from each provider's authority and cached.
//! An unknown `kid` triggers one refetch, at most once per
//! [`MIN_REFRESH_INTERVAL`], so rotated keys are picked up.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use hostkit_config::{AuthenticationConfig, JwtBearerConfig};
use http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use http::{HeaderMap, StatusCode};
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

/// Shortest time between two key fetches for the same provider
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("no signing key matches kid {0:?}")]
    UnknownKey(Option<String>),
    #[error("key discovery failed: {0}")]
    Discovery(#[from] reqwest::Error),
    #[error("bearer provider has no authority")]
    NoAuthority,
}

/// Authenticated caller, available to handlers as a request extension
#[derive(Debug, Clone)]
pub struct Principal {
    /// Provider that accepted the token
    pub scheme: String,
    pub claims: Map<String, Value>,
}

impl Principal {
    pub fn subject(&self) -> Option<&str> {
        self.claim("sub")
    }

    /// Display name for logs, falling back to the subject
    pub fn user(&self) -> Option<&str> {
        ["name", "preferred_username", "upn"]
            .into_iter()
            .find_map(|claim| self.claim(claim))
            .or_else(|| self.subject())
    }

    fn claim(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(Value::as_str)
    }
}

#[derive(Deserialize)]
struct Discovery {
    jwks_uri: String,
}

struct CachedKeys {
    keys: Arc<JwkSet>,
    fetched_at: Instant,
}

/// One configured JWT bearer provider
struct BearerProvider {
    scheme: String,
    metadata_address: Option<String>,
    validation: Validation,
    client: reqwest::Client,
    cache: RwLock<Option<CachedKeys>>,
}

impl BearerProvider {
    fn new(config: &JwtBearerConfig, client: reqwest::Client) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = config.validate_lifetime;
        validation.validate_nbf = config.validate_lifetime;
        if !config.validate_lifetime {
            validation.required_spec_claims.clear();
        }

        if config.validate_issuer
            && let Some(issuer) = &config.issuer
        {
            validation.set_issuer(&[issuer]);
        }

        match &config.audience {
            Some(audience) if config.validate_audience => validation.set_audience(&[audience]),
            _ => validation.validate_aud = false,
        }

        Self {
            scheme: config.provider.clone(),
            metadata_address: config.metadata_address(),
            validation,
            client,
            cache: RwLock::new(None),
        }
    }

    async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let header = jsonwebtoken::decode_header(token)?;
        let kid = header.kid.as_deref();

        let jwk = match select_key(&*self.keys(false).await?, kid) {
            Some(jwk) => jwk,
            None => select_key(&*self.keys(true).await?, kid).ok_or_else(|| AuthError::UnknownKey(header.kid.clone()))?,
        };

        let key = DecodingKey::from_jwk(&jwk)?;
        let validation = self.validation_for(header.alg);
        let data = jsonwebtoken::decode::<Map<String, Value>>(token, &key, &validation)?;

        Ok(Principal {
            scheme: self.scheme.clone(),
            claims: data.claims,
        })
    }

    fn validation_for(&self, algorithm: Algorithm) -> Validation {
        let mut validation = self.validation.clone();
        validation.algorithms = vec![algorithm];
        validation
    }

    /// Cached key set, refetched when empty or when `refresh` is set and the
    /// cache is older than [`MIN_REFRESH_INTERVAL`]
    async fn keys(&self, refresh: bool) -> Result<Arc<JwkSet>, AuthError> {
        if !refresh && let Some(cached) = self.cache.read().await.as_ref() {
            return Ok(cached.keys.clone());
        }

        let mut cache = self.cache.write().await;
        if let Some(cached) = cache.as_ref()
            && (!refresh || cached.fetched_at.elapsed() < MIN_REFRESH_INTERVAL)
        {
            return Ok(cached.keys.clone());
        }

        let keys = Arc::new(self.fetch_keys().await?);
        tracing::debug!(scheme = %self.scheme, keys = keys.keys.len(), "fetched signing keys");
        *cache = Some(CachedKeys {
            keys: keys.clone(),
            fetched_at: Instant::now(),
        });

        Ok(keys)
    }

    async fn fetch_keys(&self) -> Result<JwkSet, AuthError> {
        let metadata_address = self.metadata_address.as_deref().ok_or(AuthError::NoAuthority)?;

        let discovery: Discovery = self
            .client
            .get(metadata_address)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let keys = self
            .client
            .get(&discovery.jwks_uri)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(keys)
    }

    #[cfg(test)]
    async fn preload(&self, keys: JwkSet) {
        *self.cache.write().await = Some(CachedKeys {
            keys: Arc::new(keys),
            fetched_at: Instant::now(),
        });
    }
}

fn select_key(keys: &JwkSet, kid: Option<&str>) -> Option<Jwk> {
    match kid {
        Some(kid) => keys.find(kid).cloned(),
        None => keys.keys.first().cloned(),
    }
}

/// Bearer token validation shared by every web-API route
#[derive(Clone)]
pub struct Authenticator {
    providers: Arc<[BearerProvider]>,
    config: Arc<AuthenticationConfig>,
}

impl Authenticator {
    /// Build the providers, default scheme first
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client for key discovery cannot be built
    pub fn from_config(config: &AuthenticationConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build key discovery client: {e}"))?;

        let mut providers: Vec<BearerProvider> = config
            .bearer_tokens
            .iter()
            .map(|token| BearerProvider::new(token, client.clone()))
            .collect();

        if let Some(default) = config.default_scheme() {
            providers.sort_by_key(|provider| provider.scheme != default);
        }

        Ok(Self {
            providers: providers.into(),
            config: Arc::new(config.clone()),
        })
    }

    /// Try each provider in order and return the first principal
    ///
    /// # Errors
    ///
    /// Returns the last provider's error when none accepts the token
    pub async fn authenticate(&self, token: &str) -> Result<Principal, AuthError> {
        let mut last_error = AuthError::NoAuthority;

        for provider in &*self.providers {
            match provider.verify(token).await {
                Ok(principal) => return Ok(principal),
                Err(e) => {
                    tracing::debug!(scheme = %provider.scheme, error = %e, "token rejected by provider");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}

/// Token from `Authorization: Bearer <token>`
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn challenge(error: Option<&str>) -> Response {
    let value = match error {
        Some(error) => format!("Bearer error=\"{error}\""),
        None => "Bearer".to_owned(),
    };
    (StatusCode::UNAUTHORIZED, [(WWW_AUTHENTICATE, value)]).into_response()
}

/// Require a valid bearer token outside the anonymous paths
///
/// The accepted [`Principal`] is inserted into the request and copied onto
/// the response, where the usage log reads it.
pub async fn auth_middleware(State(auth): State<Authenticator>, mut request: Request, next: Next) -> Response {
    if auth.config.is_anonymous(request.uri().path()) {
        return next.run(request).await;
    }

    let Some(token) = bearer_token(request.headers()) else {
        return challenge(None);
    };

    match auth.authenticate(token).await {
        Ok(principal) => {
            request.extensions_mut().insert(principal.clone());
            let mut response = next.run(request).await;
            response.extensions_mut().insert(principal);
            response
        }
        Err(e) => {
            tracing::warn!(uri = %request.uri(), error = %e, "bearer authentication failed");
            challenge(Some("invalid_token"))
        }
    }
}
