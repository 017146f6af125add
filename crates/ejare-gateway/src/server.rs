//! HTTP server implementation using Axum.

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    routing::{get, post},
};
use ejare_auth::TokenService;
use ejare_core::Config;
use ejare_notify::Dispatcher;
use ejare_store::ContractStore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared state for the API server.
pub struct AppState {
    pub store: Mutex<ContractStore>,
    pub tokens: TokenService,
    pub dispatcher: Dispatcher,
}

/// Build the Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(super::routes::health))
        .route("/api/login", post(super::routes::login))
        .route(
            "/api/contracts",
            get(super::routes::list_contracts).post(super::routes::create_contract),
        )
        .route(
            "/api/contracts/{contract_number}/sign",
            post(super::routes::sign_contract),
        )
        .route(
            "/api/contracts/{contract_number}/terminate",
            post(super::routes::terminate_contract),
        )
        .route("/api/charts/income", get(super::routes::income_chart))
        .route("/api/charts/status", get(super::routes::status_chart))
        .route(
            "/api/settings/notifications",
            get(super::routes::get_notification_settings)
                .put(super::routes::update_notification_settings)
                .post(super::routes::update_notification_settings),
        )
        .route("/api/notifications/test", post(super::routes::test_notification))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn start(config: &Config) -> anyhow::Result<()> {
    let store = ContractStore::open(&config.database.path)?;
    let tokens = TokenService::new(config.jwt_secret.clone())?;
    let dispatcher = Dispatcher::new(config);

    let state = Arc::new(AppState {
        store: Mutex::new(store),
        tokens,
        dispatcher,
    });

    let app = build_router(state);
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Ejare API listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
