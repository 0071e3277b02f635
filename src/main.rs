mod api;
mod db;
mod error;
mod geo;
mod holdings;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::AppState;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "farm_registry_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Get database path from environment or use default
    let db_path = std::env::var("FARM_REGISTRY_DB_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir().join("farm-registry").join("registry.db"));

    // Initialize database
    let database = db::init_database(&db_path)
        .await
        .expect("Failed to initialize database");
    tracing::info!("Database initialized at {:?}", db_path);

    let state = Arc::new(AppState::new(database));

    // Build router with explicit routes
    let app = Router::new()
        // Farmers (listing carries the computed holdings)
        .route("/api/farmers", get(api::farmer_handlers::list_farmers))
        .route("/api/farmers", post(api::farmer_handlers::create_farmer))
        .route("/api/farmers/:id", get(api::farmer_handlers::get_farmer))
        .route("/api/farmers/:id", put(api::farmer_handlers::update_farmer))
        .route("/api/farmers/:id", delete(api::farmer_handlers::delete_farmer))
        // Farms
        .route("/api/farms", get(api::farm_handlers::list_farms))
        .route("/api/farms", post(api::farm_handlers::create_farm))
        .route("/api/farms/crops", get(api::farm_handlers::list_crops))
        .route("/api/farms/:id", get(api::farm_handlers::get_farm))
        .route("/api/farms/:id", put(api::farm_handlers::update_farm))
        .route("/api/farms/:id", delete(api::farm_handlers::delete_farm))
        .route("/api/farms/:id/archived", post(api::farm_handlers::toggle_archived))
        // Mortgages
        .route("/api/mortgages", get(api::mortgage_handlers::list_mortgages))
        .route("/api/mortgages", post(api::mortgage_handlers::create_mortgage))
        .route("/api/mortgages/:id", get(api::mortgage_handlers::get_mortgage))
        .route("/api/mortgages/:id", put(api::mortgage_handlers::update_mortgage))
        .route("/api/mortgages/:id", delete(api::mortgage_handlers::delete_mortgage))
        // Disbursements
        .route("/api/disbursements", get(api::disbursement_handlers::list_disbursements))
        .route("/api/disbursements", post(api::disbursement_handlers::create_disbursement))
        .route("/api/disbursements/:id", get(api::disbursement_handlers::get_disbursement))
        .route("/api/disbursements/:id", put(api::disbursement_handlers::update_disbursement))
        .route("/api/disbursements/:id", delete(api::disbursement_handlers::delete_disbursement))
        // Users
        .route("/api/users", get(api::user_handlers::list_users))
        .route("/api/users", post(api::user_handlers::create_user))
        .route("/api/users/:id", get(api::user_handlers::get_user))
        .route("/api/users/:id", put(api::user_handlers::update_user))
        .route("/api/users/:id", delete(api::user_handlers::delete_user))
        // Statistics
        .route("/api/statistics/count", get(api::stats_handlers::stat_count))
        .route("/api/statistics/recent", get(api::stats_handlers::stat_recent))
        .route("/api/statistics/overview", get(api::stats_handlers::stat_overview))
        // Health check
        .route("/health", get(api::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = std::env::var("FARM_REGISTRY_ADDR")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8080)));
    tracing::info!("Farm Registry Server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");
    axum::serve(listener, app).await.expect("Server error");
}
