//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, body limit, request ID, metrics)
//! - Time out read requests; mints are never cut off mid-distribution
//! - Rate limit mint requests
//! - Bind server to listener and shut down gracefully

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::MinterConfig;
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::http::response::render_timeout;
use crate::http::{health, tokens, wallets};
use crate::ledger::backend::Ledger;
use crate::minting::MintOrchestrator;
use crate::observability::metrics;
use crate::security::{rate_limit_middleware, RateLimiterState};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<MintOrchestrator>,
    pub ledger: Arc<dyn Ledger>,
}

impl AppState {
    pub fn new(orchestrator: Arc<MintOrchestrator>, ledger: Arc<dyn Ledger>) -> Self {
        Self {
            orchestrator,
            ledger,
        }
    }
}

/// HTTP server for the minting API.
pub struct HttpServer {
    router: Router,
    config: MinterConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: MinterConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Only the read routes carry the request timeout. A mint runs to
    /// completion on its own task, so `POST /tokens` is bounded by the
    /// ledger's per-batch confirmation timeout instead.
    #[allow(deprecated)]
    fn build_router(config: &MinterConfig, state: AppState) -> Router {
        let mut create_token = post(tokens::create_token);
        if config.rate_limit.enabled {
            let limiter = Arc::new(RateLimiterState::new(&config.rate_limit));
            create_token =
                create_token.route_layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));
        }

        let reads = Router::new()
            .route("/tokens/{id}", get(tokens::get_token))
            .route("/tokens/{id}/metadata", get(tokens::get_token_metadata))
            .route("/tokens/{id}/holders", get(tokens::get_token_holders))
            .route("/wallets/{address}/validate", get(wallets::validate_wallet))
            .route("/wallets/{address}/balance", get(wallets::wallet_balance))
            .route(
                "/wallets/{address}/tokens/{mint}",
                get(wallets::wallet_token_balance),
            )
            .route("/health", get(health::health))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::map_response(render_timeout));

        Router::new()
            .route("/tokens", create_token)
            .merge(reads)
            .route_layer(middleware::from_fn(track_metrics))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(
                        TraceLayer::new_for_http()
                            .make_span_with(|req: &Request<Body>| make_request_span(req)),
                    )
                    .layer(propagate_request_id_layer())
                    .layer(RequestBodyLimitLayer::new(config.security.max_body_size)),
            )
    }

    /// The router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` resolves, then drain in-flight requests.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &MinterConfig {
        &self.config
    }
}

/// Record request count and latency per matched route.
async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    metrics::record_request(&method, &route, response.status().as_u16(), start);
    response
}
