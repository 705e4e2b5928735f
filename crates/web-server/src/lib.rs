use analytics::CrossoverAnalyzer;
use axum::{routing::get, Router};
use configuration::AnalysisSettings;
use database::DbRepository;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub db_repo: DbRepository,
    pub analyzer: CrossoverAnalyzer,
    /// Windows used when a request does not specify its own.
    pub analysis: AnalysisSettings,
}

impl AppState {
    pub fn new(db_repo: DbRepository, analysis: AnalysisSettings) -> Self {
        Self {
            db_repo,
            analyzer: CrossoverAnalyzer::new(),
            analysis,
        }
    }
}

/// Builds the application routes and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/strategy/performance", get(handlers::get_strategy_performance))
        .with_state(state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// Serves the API on `addr` until Ctrl-C is received.
///
/// Tracing is expected to be initialised by the caller. The database pool
/// inside `state` is left open; closing it is the caller's job once this
/// returns.
pub async fn run_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for the shutdown signal.");
    }
}
