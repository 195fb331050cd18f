//! Token authority serving OpenID discovery and an HMAC key set

use axum::routing::get;
use axum::{Json, Router};
use axum::http::HeaderMap;
use axum::http::header::HOST;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};

pub const ISSUER: &str = "https://login.example.com/tenant/v2.0";
pub const AUDIENCE: &str = "api://hostkit";
pub const KEY_ID: &str = "integration";

const SECRET: &[u8] = b"hostkit-test-signing-secret-0123";
const SECRET_B64: &str = "aG9zdGtpdC10ZXN0LXNpZ25pbmctc2VjcmV0LTAxMjM";

/// Discovery and key set routes; the `jwks_uri` points back at the caller's host
pub fn authority_routes() -> Router {
    Router::new()
        .route("/.well-known/openid-configuration", get(discovery))
        .route("/keys", get(|| async { Json(json!({ "keys": [{ "kty": "oct", "kid": KEY_ID, "k": SECRET_B64 }] })) }))
}

async fn discovery(headers: HeaderMap) -> Json<Value> {
    let host = headers.get(HOST).and_then(|v| v.to_str().ok()).unwrap_or("localhost");
    Json(json!({ "issuer": ISSUER, "jwks_uri": format!("http://{host}/keys") }))
}

/// Sign a token for `subject` expiring `expires_in` seconds from now
pub fn token(subject: &str, expires_in: i64) -> String {
    let now = i64::try_from(jsonwebtoken::get_current_timestamp()).unwrap();
    let claims = json!({
        "sub": subject,
        "iss": ISSUER,
        "aud": AUDIENCE,
        "exp": now + expires_in,
    });

    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(KEY_ID.to_owned());
    jsonwebtoken::encode(&header, &claims, &EncodingKey::from_secret(SECRET)).unwrap()
}
