//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the proxy handler on every path
//! - Wire up middleware (request ID, tracing, timeout with a JSON body)
//! - Serve over plain TCP or TLS until shutdown
//! - Hand each request to the pipeline

use axum::{
    body::Body,
    extract::State,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    middleware::map_response,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ProxyConfig;
use crate::http::request::{
    propagate_request_id_layer, request_id, set_request_id_layer, to_proxy_request,
};
use crate::http::tls::load_tls_config;
use crate::pipeline::{Pipeline, ProxyResponse};

/// How long in-flight TLS connections may drain after shutdown.
const TLS_DRAIN_SECS: u64 = 10;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

/// HTTP front end for the pipeline.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and pipeline.
    pub fn new(config: ProxyConfig, pipeline: Pipeline) -> Self {
        let state = AppState {
            pipeline: Arc::new(pipeline),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(map_response(json_timeout))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The configured router, for serving or driving directly in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Bind the configured address and serve, over TLS when configured.
    pub async fn serve(self, shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        match self.config.listener.tls.clone() {
            None => {
                let listener = TcpListener::bind(&self.config.listener.bind_address).await?;
                self.run(listener, shutdown).await
            }
            Some(tls) => {
                let addr: SocketAddr = self
                    .config
                    .listener
                    .bind_address
                    .parse()
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
                let rustls = load_tls_config(&tls).await?;
                self.run_tls(addr, rustls, shutdown).await
            }
        }
    }

    async fn run_tls(
        self,
        addr: SocketAddr,
        rustls: axum_server::tls_rustls::RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTPS server received shutdown signal");
            drain.graceful_shutdown(Some(Duration::from_secs(TLS_DRAIN_SECS)));
        });

        axum_server::bind_rustls(addr, rustls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Main proxy handler. Every method is answered with an upstream GET.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let proxy_request = to_proxy_request(request.uri());

    tracing::debug!(
        request_id = %request_id(request.headers()),
        method = %request.method(),
        path = %proxy_request.raw_path,
        "Proxying request"
    );

    state.pipeline.handle(proxy_request).await.into_response()
}

/// Give the bare 408 from the timeout layer the pipeline's JSON error shape.
async fn json_timeout(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT && !response.headers().contains_key(CONTENT_TYPE) {
        tracing::warn!("Request timed out before the pipeline answered");
        return ProxyResponse::error(StatusCode::REQUEST_TIMEOUT.as_u16(), "Request timed out")
            .into_response();
    }
    response
}
