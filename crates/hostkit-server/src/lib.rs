//! HTTP hosting for hostkit applications
//!
//! [`Server`] wraps the application's routes with the configured middleware:
//! request ids, tracing, CORS, compression, the usage log, panic capture and
//! the exception mapper. Web-API routes additionally require a bearer token
//! when `[authentication]` configures a provider.

mod app_info;
mod auth;
mod cors;
mod exception;
mod health;
mod request_id;
mod spa;
mod usage;

use std::net::SocketAddr;

use axum::Router;
use hostkit_config::Config;
use http::HeaderName;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub use app_info::AppInfo;
pub use auth::{AuthError, Authenticator, MIN_REFRESH_INTERVAL, Principal, auth_middleware};
pub use exception::{ExceptionState, MappedFault, exception_middleware, panic_response, strategy_from_config};

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration and the application's routes
    ///
    /// # Errors
    ///
    /// Returns an error if the request id header is invalid, the key
    /// discovery client cannot be built, or preparing the single-page
    /// application fails
    pub async fn new(config: Config, routes: Router) -> anyhow::Result<Self> {
        let server = &config.server;
        let listen_address = server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 5000)));

        let mut app = Router::new();

        if server.health.enabled {
            let health = Router::new()
                .route(&server.health.path, axum::routing::get(health::health_handler))
                .with_state(health::Health::new(&config.program.app));
            app = app.merge(health);
        }

        // Application controllers and program info make up the web API
        if server.web_api {
            let mut api = routes.merge(app_info::app_info_router(&config.program));
            if config.authentication.has_any() {
                let authenticator = auth::Authenticator::from_config(&config.authentication)?;
                api = api.route_layer(axum::middleware::from_fn_with_state(authenticator, auth::auth_middleware));
            }
            app = app.merge(api);
        }

        if let Some(spa) = &server.spa {
            spa::prepare(spa).await?;
            app = spa::mount(app, spa);
        }

        // Apply middleware layers (innermost first)

        app = app.layer(CatchPanicLayer::custom(exception::panic_response));

        // Exception mapper sits outside panic capture so panics are mapped too
        app = app.layer(axum::middleware::from_fn_with_state(
            ExceptionState::from_config(&server.errors),
            exception::exception_middleware,
        ));

        // Usage sees the final status, including mapped faults and panics
        if server.usage.enabled {
            app = app.layer(axum::middleware::from_fn(usage::usage_middleware));
        }

        app = app.layer(TraceLayer::new_for_http().make_span_with(request_id::make_span));

        if server.web_api
            && let Some(cors_config) = &server.cors
        {
            app = app.layer(cors::cors_layer(cors_config));
        }

        if server.compression.enabled {
            let compression = CompressionLayer::new()
                .gzip(server.compression.gzip)
                .br(server.compression.br);
            app = app.layer(compression);
        }

        // Request id (outermost, so every inner layer sees it)
        let header = HeaderName::from_bytes(server.request_id.header.as_bytes())
            .map_err(|e| anyhow::anyhow!("invalid request id header: {e}"))?;
        app = app
            .layer(PropagateRequestIdLayer::new(header.clone()))
            .layer(SetRequestIdLayer::new(header, MakeRequestUuid));

        tracing::info!(
            app = %config.program.app,
            environment = config.program.environment.as_deref().unwrap_or("unset"),
            authentication = %config.authentication.schemes().join(","),
            default_scheme = config.authentication.default_scheme().unwrap_or("none"),
            spa = server.spa.is_some(),
            web_api = server.web_api,
            usage = server.usage.enabled,
            error_shape = server.errors.shape.as_str(),
            "server configured"
        );

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(
            listener,
            self.router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            tracing::info!("graceful shutdown initiated");
        })
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::routing::get;
    use hostkit_core::{ArgumentError, Fault};
    use http::StatusCode;
    use tower::ServiceExt;

    use super::*;

    async fn rejects() -> Result<&'static str, Fault> {
        Err(ArgumentError::new("id must be positive").into())
    }

    fn routes() -> Router {
        Router::new().route("/api/check", get(rejects))
    }

    #[tokio::test]
    async fn routes_are_wrapped_with_the_mapper() {
        let server = Server::new(Config::default(), routes()).await.unwrap();
        let response = server
            .into_router()
            .oneshot(http::Request::get("/api/check").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().contains_key("x-request-id"));
        let body: serde_json::Value =
            serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["message"], "id must be positive");
    }

    #[tokio::test]
    async fn web_api_off_hides_routes() {
        let mut config = Config::default();
        config.server.web_api = false;
        let router = Server::new(config, routes()).await.unwrap().into_router();

        let response = router
            .clone()
            .oneshot(http::Request::get("/api/check").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = router
            .oneshot(http::Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn bearer_provider_protects_web_api_only() {
        let config = Config::from_toml_str(
            r#"
            [[authentication.bearer_tokens]]
            authority = "https://login.example.com/tenant"
            issuer = "https://login.example.com/tenant/v2.0"
            audience = "api://hostkit"
            "#,
        )
        .unwrap();
        let router = Server::new(config, routes()).await.unwrap().into_router();

        let response = router
            .clone()
            .oneshot(http::Request::get("/api/check").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()["www-authenticate"], "Bearer");

        for path in ["/health", "/api/app-info"] {
            let response = router
                .clone()
                .oneshot(http::Request::get(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{path}");
        }
    }

    #[tokio::test]
    async fn default_listen_address() {
        let server = Server::new(Config::default(), Router::new()).await.unwrap();
        assert_eq!(server.listen_address(), SocketAddr::from(([0, 0, 0, 0], 5000)));
    }
}
