use crate::config::ReportConfig;
use crate::handlers;
use crate::models::BrandConfig;
use crate::services::{ReportPipeline, ReportStore};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method, Request},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Request bodies above this size are rejected with 413.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: ReportConfig,
    pub brand: Arc<BrandConfig>,
    pub pipeline: Arc<ReportPipeline>,
    pub store: ReportStore,
}

impl AppState {
    pub fn new(config: ReportConfig, brand: BrandConfig, pipeline: ReportPipeline) -> Self {
        let store = ReportStore::new(config.store.ttl(), config.store.max_items);
        Self {
            config,
            brand: Arc::new(brand),
            pipeline: Arc::new(pipeline),
            store,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::service_info))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        .route("/generate-pdf", post(handlers::generate_pdf))
        .route("/generate-pdf-base64", post(handlers::generate_pdf_base64))
        .route("/generate-pdf-url", post(handlers::generate_pdf_url))
        .route("/pdfs", get(handlers::list_pdfs))
        .route(
            "/pdfs/:pdf_id",
            get(handlers::get_pdf).delete(handlers::delete_pdf),
        )
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        // Add metrics middleware
        .layer(from_fn(metrics_middleware))
        // Add tracing layer
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
        // Add security headers middleware
        .layer(from_fn(security_headers_middleware))
        // Add CORS layer
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        )
}

type Server = Pin<Box<dyn Future<Output = std::io::Result<()>> + Send>>;

pub struct Application {
    port: u16,
    server: Server,
    state: AppState,
    shutdown: CancellationToken,
}

impl Application {
    pub async fn build(config: ReportConfig) -> Result<Self, AppError> {
        config.chart.validate()?;
        let brand = BrandConfig::load(&config.brand).map_err(|e| {
            tracing::error!("Failed to load brand configuration: {}", e);
            e
        })?;
        let pipeline = ReportPipeline::from_settings(&config.chart);
        let state = AppState::new(config.clone(), brand, pipeline);

        let shutdown = CancellationToken::new();
        state
            .store
            .spawn_janitor(config.store.cleanup_interval(), shutdown.clone());

        let app = build_router(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            brand = %state.brand.name,
            chart_width = config.chart.width_px,
            chart_height = config.chart.height_px,
            store_ttl_minutes = config.store.ttl_minutes,
            "Listening on {}",
            port
        );

        let server = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
            .into_future();

        Ok(Self {
            port,
            server: Box::pin(server),
            state,
            shutdown,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn store(&self) -> &ReportStore {
        &self.state.store
    }

    /// Token that stops the server and the store janitor when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let result = self.server.await;
        // Stop background tasks however the server ended
        self.shutdown.cancel();
        result
    }
}

async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = token.cancelled() => {},
    }

    token.cancel();
    tracing::info!("Shutdown signal received");
}
