use std::time::Duration;

use hostkit_config::{AnyOrList, CorsConfig};
use http::header::{HeaderName, HeaderValue};
use http::Method;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer, ExposeHeaders};

/// Build the CORS layer for the web API
///
/// Wildcard methods and headers are mirrored from the preflight request when
/// credentials are allowed, since browsers reject `*` in that case.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = match &config.origins {
        AnyOrList::Any => AllowOrigin::any(),
        AnyOrList::List(origins) => AllowOrigin::list(parse_all::<HeaderValue>(origins)),
    };

    let methods = match &config.methods {
        AnyOrList::Any if config.credentials => AllowMethods::mirror_request(),
        AnyOrList::Any => AllowMethods::any(),
        AnyOrList::List(methods) => AllowMethods::list(parse_all::<Method>(methods)),
    };

    let headers = match &config.headers {
        AnyOrList::Any if config.credentials => AllowHeaders::mirror_request(),
        AnyOrList::Any => AllowHeaders::any(),
        AnyOrList::List(headers) => AllowHeaders::list(parse_all::<HeaderName>(headers)),
    };

    let mut layer = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(config.credentials);

    if config.exposes_any() {
        layer = layer.expose_headers(ExposeHeaders::any());
    } else if !config.expose_headers.is_empty() {
        layer = layer.expose_headers(parse_all::<HeaderName>(&config.expose_headers));
    }

    if let Some(seconds) = config.max_age {
        layer = layer.max_age(Duration::from_secs(seconds));
    }

    layer
}

/// Entries were checked during config validation; anything unparsable is dropped
fn parse_all<T: std::str::FromStr>(values: &[String]) -> Vec<T> {
    values.iter().filter_map(|value| value.parse().ok()).collect()
}
