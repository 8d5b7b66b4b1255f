use axum::{Router, routing::get};
use database::EntityRepository;
use kpi_engine::KpiEngine;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
// Note: Tracing is initialized by the binary, not here.

pub mod auth;
pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub repo: EntityRepository,
    pub engine: KpiEngine,
}

/// The main function to configure and run the web server.
pub async fn run_server(addr: SocketAddr) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let db_pool = database::connect().await?;
    database::run_migrations(&db_pool).await?;
    let repo = EntityRepository::new(db_pool);

    let config = configuration::load_config()?;
    let engine = KpiEngine::new(config.assumptions);

    let app_state = Arc::new(AppState { repo, engine });
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    // --- DEFINE THE APPLICATION ROUTES ---
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/admin/kpis", get(handlers::get_admin_kpis))
        .with_state(app_state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http());

    tracing::info!("KPI web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
