use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    BoxError, Router,
    error_handling::HandleErrorLayer,
    extract::FromRef,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use carelink_auth::{
    AccessAuthState, AccessTokenVerifier, AuthError, ConfigError, RefreshService, RefreshState,
    method_not_allowed, refresh_handler, session_handler,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::handlers;
use crate::middleware as app_middleware;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub refresh: RefreshState,
    pub access: AccessAuthState,
}

impl AppState {
    pub fn from_config(cfg: &AppConfig) -> Result<Self, ConfigError> {
        let keys = cfg.auth.signing_keys()?;
        if keys.uses_development_defaults {
            tracing::warn!(
                environment = %cfg.auth.environment,
                "Signing secrets not configured, using development defaults"
            );
        }

        let service = Arc::new(RefreshService::from_config(&cfg.auth, &keys));
        let verifier = Arc::new(AccessTokenVerifier::new(&keys.access));

        Ok(Self {
            refresh: RefreshState::new(service, cfg.auth.expose_error_details()),
            access: AccessAuthState::new(verifier),
        })
    }
}

pub fn build_app(cfg: &AppConfig) -> Result<Router, ConfigError> {
    let state = AppState::from_config(cfg)?;
    Ok(build_router(state, cfg.request_timeout(), cfg.server.body_limit_bytes))
}

pub fn build_router(state: AppState, request_timeout: Duration, body_limit: usize) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .route(
            "/auth/refresh",
            post(refresh_handler).fallback(method_not_allowed),
        )
        .route("/auth/session", get(session_handler))
        .with_state(state)
        // Middleware stack (outermost last: request id -> cors -> trace -> body limit -> timeout)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout))
                .timeout(request_timeout),
        )
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    let req_id = req
                        .extensions()
                        .get::<axum::http::HeaderValue>()
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri().path(),
                        http.status_code = Empty,
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>, latency: Duration, span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(app_middleware::request_id))
}

async fn handle_timeout(err: BoxError) -> Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::warn!("request exceeded configured timeout");
        AuthError::Timeout.into_response()
    } else {
        tracing::error!(error = %err, "unhandled middleware error");
        AuthError::unexpected(err.to_string()).into_response()
    }
}

pub struct CarelinkServer {
    addr: SocketAddr,
    app: Router,
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub fn build(self) -> Result<CarelinkServer, ConfigError> {
        let app = build_app(&self.config)?;

        Ok(CarelinkServer {
            addr: self.addr,
            app,
        })
    }
}

impl CarelinkServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
